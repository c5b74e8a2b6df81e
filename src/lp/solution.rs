use super::expr::LinExpr;
use super::model::{Model, Var};
use super::{Error, Result};
use std::fmt;

/// Values below this are reported as zero, and integral values are snapped within it
pub const TOLERANCE: f64 = 1e-6;

/// The result of a successful solve: one value per variable plus the objective value.
///
/// A `Solution` only exists for models the backend solved to optimality; infeasible and unbounded
/// models never produce one.
#[derive(Debug, Clone)]
pub struct Solution {
    model: u32,
    model_name: String,
    names: Vec<String>,
    values: Vec<f64>,
    objective: f64,
}

impl Solution {
    /// Builds a solution from raw solver values (in column order). Values of integer and binary
    /// variables are rounded when they are within [`TOLERANCE`] of a whole number.
    pub fn new(model: &Model, values: Vec<f64>, objective: f64) -> Result<Solution> {
        if values.len() != model.vars().len() {
            return Err(Error::Backend(format!(
                "expected {} values, the solver returned {}",
                model.vars().len(),
                values.len()
            )));
        }

        let values = model
            .vars()
            .iter()
            .zip(values)
            .map(|(data, value)| match data.domain.is_integral() {
                true if (value - value.round()).abs() <= TOLERANCE => value.round(),
                _ => value,
            })
            .collect();

        Ok(Solution {
            model: model.id(),
            model_name: model.name().to_string(),
            names: model.vars().iter().map(|v| v.name.clone()).collect(),
            values,
            objective,
        })
    }

    pub fn objective_value(&self) -> f64 {
        self.objective
    }

    pub fn value(&self, var: Var) -> Result<f64> {
        self.check(var)?;
        Ok(self.values[var.index()])
    }

    /// Evaluates an expression over the solved values
    pub fn eval(&self, expr: &LinExpr) -> Result<f64> {
        for (var, _) in expr.terms() {
            self.check(*var)?;
        }
        Ok(expr.evaluate(|var| self.values[var.index()]))
    }

    /// `(name, value)` for every variable, in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn report(&self) -> SolutionReport<'_> {
        SolutionReport { solution: self }
    }

    fn check(&self, var: Var) -> Result<()> {
        match var.model_id() == self.model && var.index() < self.values.len() {
            true => Ok(()),
            false => Err(Error::ForeignVariable {
                var: var.to_string(),
                model: self.model_name.clone(),
            }),
        }
    }
}

/// Human readable listing of a solution: the objective and every non-zero variable
pub struct SolutionReport<'s> {
    solution: &'s Solution,
}

impl<'s> fmt::Display for SolutionReport<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "solution for: {}", self.solution.model_name)?;
        write!(f, "objective: {:.3}", self.solution.objective)?;
        for (name, value) in self.solution.iter() {
            if value.abs() > TOLERANCE {
                write!(f, "\n  {} = {:.3}", name, value)?;
            }
        }
        Ok(())
    }
}
