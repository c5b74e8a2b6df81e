use super::backend::{default_backend, Backend, SolveOptions};
use super::expr::{Cmp, Constraint, LinExpr};
use super::solution::Solution;
use super::{Error, Result};
use derive_more::Display;
use log::{debug, trace};
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

/// Source of model identities, used to tell variables of different models apart
static NEXT_MODEL_ID: AtomicU32 = AtomicU32::new(0);

/// The numeric domain of a decision variable
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    #[display(fmt = "continuous")]
    Continuous,
    #[display(fmt = "integer")]
    Integer,
    #[display(fmt = "binary")]
    Binary,
}

impl Domain {
    /// Whether solved values must be whole numbers
    pub fn is_integral(&self) -> bool {
        !matches!(self, Domain::Continuous)
    }

    /// Checks that `bounds` is a non-empty range that fits the domain
    fn check(&self, name: &str, bounds: &Range<f64>) -> Result<()> {
        let (lb, ub) = (bounds.start, bounds.end);
        let valid = match self {
            _ if lb.is_nan() || ub.is_nan() || lb > ub => false,
            Domain::Continuous => true,
            Domain::Integer => lb.ceil() <= ub.floor(),
            Domain::Binary => lb >= 0.0 && ub <= 1.0 && lb.ceil() <= ub.floor(),
        };

        match valid {
            true => Ok(()),
            false => Err(Error::InvalidBounds {
                name: name.to_string(),
                domain: *self,
                lb,
                ub,
            }),
        }
    }
}

/// Direction of the objective
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    #[display(fmt = "minimize")]
    Minimize,
    #[display(fmt = "maximize")]
    Maximize,
}

/// Handle to a decision variable of one particular [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    model: u32,
    index: usize,
}

impl Var {
    /// The column of the variable in its model
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn model_id(&self) -> u32 {
        self.model
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.index)
    }
}

/// Index of a constraint in its model
pub type ConstrIndex = usize;

#[derive(Debug, Clone)]
pub struct VarData {
    pub name: String,
    pub domain: Domain,
    pub lb: f64,
    pub ub: f64,
}

#[derive(Debug, Clone)]
pub struct ConstrData {
    pub name: String,
    pub constraint: Constraint,
}

/// A linear or mixed-integer model.
///
/// Models are independent values: each owns its variables, and a [`Var`] from one model is
/// rejected by every other model.
#[derive(Debug)]
pub struct Model {
    id: u32,
    name: String,
    vars: Vec<VarData>,
    constrs: Vec<ConstrData>,
    objective: LinExpr,
    sense: Sense,
}

impl Model {
    pub fn new(name: &str) -> Model {
        Model {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            vars: Vec::new(),
            constrs: Vec::new(),
            objective: LinExpr::new(),
            sense: Sense::Minimize,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable with the given domain and bounds `lb..ub` (both inclusive).
    pub fn add_var(&mut self, name: &str, domain: Domain, bounds: Range<f64>) -> Result<Var> {
        domain.check(name, &bounds)?;
        let var = Var {
            model: self.id,
            index: self.vars.len(),
        };
        trace!("{}: adding {} variable {} in [{}, {}]", self.name, domain, name, bounds.start, bounds.end);
        self.vars.push(VarData {
            name: name.to_string(),
            domain,
            lb: bounds.start,
            ub: bounds.end,
        });
        Ok(var)
    }

    /// A continuous non-negative variable
    pub fn continuous_var(&mut self, name: &str) -> Result<Var> {
        self.continuous_var_with_lb(name, 0.0)
    }

    pub fn continuous_var_with_lb(&mut self, name: &str, lb: f64) -> Result<Var> {
        self.add_var(name, Domain::Continuous, lb..f64::INFINITY)
    }

    /// An integer non-negative variable
    pub fn integer_var(&mut self, name: &str) -> Result<Var> {
        self.integer_var_with_lb(name, 0.0)
    }

    pub fn integer_var_with_lb(&mut self, name: &str, lb: f64) -> Result<Var> {
        self.add_var(name, Domain::Integer, lb..f64::INFINITY)
    }

    pub fn binary_var(&mut self, name: &str) -> Result<Var> {
        self.add_var(name, Domain::Binary, 0.0..1.0)
    }

    /// Replaces the bounds of an existing variable, e.g. to fix a binary decision
    pub fn set_bounds(&mut self, var: Var, bounds: Range<f64>) -> Result<()> {
        self.check_var(var)?;
        let data = &mut self.vars[var.index];
        data.domain.check(&data.name, &bounds)?;
        data.lb = bounds.start;
        data.ub = bounds.end;
        Ok(())
    }

    pub fn add_constr(&mut self, name: &str, constraint: Constraint) -> Result<ConstrIndex> {
        for var in constraint.vars() {
            self.check_var(var)?;
        }
        if constraint.coefficients().any(|c| !c.is_finite()) {
            return Err(Error::NonFinite(name.to_string()));
        }

        trace!("{}: adding constraint {}", self.name, name);
        self.constrs.push(ConstrData {
            name: name.to_string(),
            constraint,
        });
        Ok(self.constrs.len() - 1)
    }

    /// Sets the objective, replacing the previous one. Models start out minimizing `0`.
    pub fn set_objective(&mut self, expr: impl Into<LinExpr>, sense: Sense) -> Result<()> {
        let expr = expr.into();
        for (var, _) in expr.terms() {
            self.check_var(*var)?;
        }
        if expr.terms().iter().any(|(_, c)| !c.is_finite()) || !expr.constant().is_finite() {
            return Err(Error::NonFinite(format!("objective of {}", self.name)));
        }
        self.objective = expr;
        self.sense = sense;
        Ok(())
    }

    pub fn vars(&self) -> &[VarData] {
        &self.vars
    }

    pub fn var(&self, var: Var) -> Result<&VarData> {
        self.check_var(var)?;
        Ok(&self.vars[var.index])
    }

    pub fn constrs(&self) -> &[ConstrData] {
        &self.constrs
    }

    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Model statistics
    pub fn info(&self) -> ModelInfo {
        let count_vars = |d: Domain| self.vars.iter().filter(|v| v.domain == d).count();
        let count_constrs = |cmp: Cmp| {
            self.constrs
                .iter()
                .filter(|c| c.constraint.cmp == cmp)
                .count()
        };
        ModelInfo {
            name: self.name.clone(),
            binary: count_vars(Domain::Binary),
            integer: count_vars(Domain::Integer),
            continuous: count_vars(Domain::Continuous),
            le: count_constrs(Cmp::Le),
            eq: count_constrs(Cmp::Eq),
            ge: count_constrs(Cmp::Ge),
            sense: self.sense,
        }
    }

    /// Solves the model with the default backend and default options
    pub fn solve(&self) -> Result<Solution> {
        self.solve_with(default_backend().as_ref(), &SolveOptions::default())
    }

    pub fn solve_with(&self, backend: &dyn Backend, options: &SolveOptions) -> Result<Solution> {
        debug!(
            "Solving model {} ({} variables, {} constraints) with {}",
            self.name,
            self.vars.len(),
            self.constrs.len(),
            backend.name()
        );
        let solution = backend.solve(self, options)?;
        debug!("Model {} solved, objective = {}", self.name, solution.objective_value());
        Ok(solution)
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    fn check_var(&self, var: Var) -> Result<()> {
        match var.model == self.id && var.index < self.vars.len() {
            true => Ok(()),
            false => Err(Error::ForeignVariable {
                var: var.to_string(),
                model: self.name.clone(),
            }),
        }
    }
}

/// Variable and constraint counts of a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub binary: usize,
    pub integer: usize,
    pub continuous: usize,
    pub le: usize,
    pub eq: usize,
    pub ge: usize,
    pub sense: Sense,
}

impl ModelInfo {
    pub fn variables(&self) -> usize {
        self.binary + self.integer + self.continuous
    }

    pub fn constraints(&self) -> usize {
        self.le + self.eq + self.ge
    }
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.name)?;
        writeln!(f, " - number of variables: {}", self.variables())?;
        writeln!(
            f,
            "   - binary={}, integer={}, continuous={}",
            self.binary, self.integer, self.continuous
        )?;
        writeln!(f, " - number of constraints: {}", self.constraints())?;
        writeln!(f, "   - linear={}", self.constraints())?;
        writeln!(f, "   - <= {}, == {}, >= {}", self.le, self.eq, self.ge)?;
        write!(f, " - objective: {}", self.sense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c;

    #[test]
    fn domains_validate_bounds() {
        let mut model = Model::new("t");
        assert!(model.add_var("x", Domain::Continuous, -1.5..2.5).is_ok());
        assert!(model.add_var("y", Domain::Integer, 0.2..0.8).is_err());
        assert!(model.add_var("z", Domain::Binary, 0.0..2.0).is_err());
        assert!(model.add_var("w", Domain::Continuous, 3.0..1.0).is_err());
        assert!(model.add_var("n", Domain::Continuous, f64::NAN..1.0).is_err());
        assert_eq!(model.vars().len(), 1);
    }

    #[test]
    fn foreign_variables_are_rejected() {
        let mut first = Model::new("first");
        let mut second = Model::new("second");
        let desk = first.integer_var("desk").unwrap();
        let cell = second.integer_var("cell").unwrap();

        assert!(first.add_constr("own", c!(desk >= 100.0)).is_ok());
        let err = first.add_constr("mixed", c!(desk + cell <= 10.0)).unwrap_err();
        assert!(matches!(err, Error::ForeignVariable { .. }));
        assert!(first.set_objective(12.0 * cell, Sense::Maximize).is_err());
        assert!(first.set_bounds(cell, 0.0..1.0).is_err());
    }

    #[test]
    fn non_finite_coefficients_are_rejected() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        assert_eq!(
            model.add_constr("bad", c!(f64::NAN * x <= 1.0)),
            Err(Error::NonFinite("bad".to_string()))
        );
    }

    #[test]
    fn info_counts_domains_and_constraints() {
        let mut model = Model::new("integer_programming");
        let b = model.binary_var("boolean_var").unwrap();
        let i = model.integer_var("int_var").unwrap();
        let x = model.continuous_var("x").unwrap();
        model.add_constr("c1", c!(b + i <= 3.0)).unwrap();
        model.add_constr("c2", c!(x == i)).unwrap();
        model.set_objective(x + i, Sense::Maximize).unwrap();

        let info = model.info();
        assert_eq!((info.binary, info.integer, info.continuous), (1, 1, 1));
        assert_eq!((info.le, info.eq, info.ge), (1, 1, 0));
        assert_eq!(info.sense, Sense::Maximize);
        assert!(info.to_string().contains("number of variables: 3"));
    }

    #[test]
    fn objective_is_replaced() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        model.set_objective(2.0 * x, Sense::Minimize).unwrap();
        model.set_objective(3.0 * x, Sense::Maximize).unwrap();
        assert_eq!(model.objective().terms(), &[(x, 3.0)]);
        assert_eq!(model.sense(), Sense::Maximize);
    }
}
