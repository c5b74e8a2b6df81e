//! The boundary to the external solvers.
//!
//! A [`Backend`] receives a finished [`Model`] and either returns a [`Solution`] or reports the
//! model as infeasible/unbounded. Which backends exist depends on the enabled cargo features:
//! `microlp` (pure Rust, default) and `gurobi` (requires a Gurobi installation and licence).
#[cfg(feature = "gurobi")]
mod solver_gurobi;
#[cfg(feature = "microlp")]
mod solver_microlp;

#[cfg(feature = "gurobi")]
pub use solver_gurobi::Gurobi;
#[cfg(feature = "microlp")]
pub use solver_microlp::MicroLp;

use super::expr::Cmp;
use super::model::{Model, Var};
use super::solution::{Solution, TOLERANCE};
use super::{Error, Result};
use log::trace;

#[cfg(not(any(feature = "microlp", feature = "gurobi")))]
compile_error!("at least one solver backend must be enabled: `microlp` or `gurobi`");

#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Stream solver progress to the log
    pub log_output: bool,
}

impl SolveOptions {
    pub fn with_log_output(log_output: bool) -> SolveOptions {
        SolveOptions { log_output }
    }
}

pub trait Backend {
    fn name(&self) -> &'static str;

    /// Solves `model`. Returns [`Error::Infeasible`] or [`Error::Unbounded`] when no optimal
    /// solution exists.
    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<Solution>;
}

/// Gurobi when compiled in, microlp otherwise
#[cfg(feature = "gurobi")]
pub fn default_backend() -> Box<dyn Backend> {
    Box::new(Gurobi::default())
}

/// Gurobi when compiled in, microlp otherwise
#[cfg(all(feature = "microlp", not(feature = "gurobi")))]
pub fn default_backend() -> Box<dyn Backend> {
    Box::new(MicroLp)
}

/// A named constraint in solver form: `Σ coeff * var  cmp  rhs`
#[derive(Debug)]
pub(crate) struct Row<'m> {
    pub name: &'m str,
    pub terms: Vec<(Var, f64)>,
    pub cmp: Cmp,
    pub rhs: f64,
}

/// Brings every constraint of the model to solver form.
///
/// Constraints whose variables cancel out are decided here instead of being handed to the
/// solver: they are dropped when they hold and make the model infeasible otherwise.
pub(crate) fn rows(model: &Model) -> Result<Vec<Row<'_>>> {
    let mut rows = Vec::with_capacity(model.constrs().len());
    for constr in model.constrs() {
        let (terms, cmp, rhs) = constr.constraint.normalized();
        if !terms.is_empty() {
            rows.push(Row {
                name: &constr.name,
                terms,
                cmp,
                rhs,
            });
            continue;
        }

        trace!("{}: constraint {} is constant", model.name(), constr.name);
        if !cmp.holds(0.0, rhs, TOLERANCE) {
            return Err(Error::Infeasible);
        }
    }
    Ok(rows)
}

/// Upper limit on bound propagation passes
const MAX_PASSES: usize = 16;

/// Column bounds tightened by the rows, one `(lb, ub)` per column.
///
/// A row `Σ a_k x_k <= b` bounds each of its columns by `b` minus the smallest activity the
/// other columns can reach. `>=` rows are negated and `==` rows count in both directions.
/// Passes repeat until no bound moves.
pub(crate) fn implied_bounds(model: &Model, rows: &[Row<'_>]) -> Vec<(f64, f64)> {
    let mut bounds: Vec<(f64, f64)> = model.vars().iter().map(|v| (v.lb, v.ub)).collect();

    let mut le_rows: Vec<(Vec<(usize, f64)>, f64)> = Vec::with_capacity(rows.len());
    for row in rows {
        let terms = row.terms.iter().map(|(var, a)| (var.index(), *a));
        let negated = || -> Vec<(usize, f64)> {
            row.terms.iter().map(|(var, a)| (var.index(), -a)).collect()
        };
        match row.cmp {
            Cmp::Le => le_rows.push((terms.collect(), row.rhs)),
            Cmp::Ge => le_rows.push((negated(), -row.rhs)),
            Cmp::Eq => {
                le_rows.push((terms.collect(), row.rhs));
                le_rows.push((negated(), -row.rhs));
            }
        }
    }

    for pass in 0..MAX_PASSES {
        let mut changed = false;
        for (terms, rhs) in &le_rows {
            let min_activity = |(col, a): &(usize, f64)| match *a > 0.0 {
                true => a * bounds[*col].0,
                false => a * bounds[*col].1,
            };
            let unbounded = terms
                .iter()
                .filter(|t| !min_activity(*t).is_finite())
                .count();
            let finite: f64 = terms
                .iter()
                .map(min_activity)
                .filter(|m| m.is_finite())
                .sum();

            let updates: Vec<(usize, f64, f64)> = terms
                .iter()
                .filter_map(|t| {
                    let own = min_activity(t);
                    let others = match (own.is_finite(), unbounded) {
                        (true, 0) => finite - own,
                        (false, 1) => finite,
                        _ => return None,
                    };
                    Some((t.0, t.1, (rhs - others) / t.1))
                })
                .collect();

            for (col, a, limit) in updates {
                let (lb, ub) = &mut bounds[col];
                let slack = TOLERANCE * (1.0 + limit.abs());
                if a > 0.0 && limit < *ub - slack {
                    *ub = limit;
                    changed = true;
                } else if a < 0.0 && limit > *lb + slack {
                    *lb = limit;
                    changed = true;
                }
            }
        }
        if !changed {
            trace!("{}: bounds settled after {} passes", model.name(), pass + 1);
            break;
        }
    }
    bounds
}

/// The objective as dense coefficients (one per column) and its constant term
pub(crate) fn objective_coefficients(model: &Model) -> (Vec<f64>, f64) {
    let objective = model.objective().clone().compact();
    let mut coeffs = vec![0.0; model.vars().len()];
    for (var, coeff) in objective.terms() {
        coeffs[var.index()] += coeff;
    }
    (coeffs, objective.constant())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c;
    use crate::lp::Sense;

    #[test]
    fn cancelled_constraints_are_decided_up_front() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        model.add_constr("holds", c!(x - x <= 1.0)).unwrap();
        assert!(rows(&model).unwrap().is_empty());

        model.add_constr("fails", c!(x + 2.0 <= x)).unwrap();
        assert_eq!(rows(&model).unwrap_err(), Error::Infeasible);
        assert_eq!(model.solve().unwrap_err(), Error::Infeasible);
    }

    #[test]
    fn objective_is_densified() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        let y = model.continuous_var("y").unwrap();
        model
            .set_objective(2.0 * y + x + y + 5.0, Sense::Maximize)
            .unwrap();
        assert_eq!(objective_coefficients(&model), (vec![1.0, 3.0], 5.0));
    }

    #[test]
    fn rows_imply_column_bounds() {
        let mut model = Model::new("t");
        let desk = model.integer_var("desk").unwrap();
        let cell = model.integer_var("cell").unwrap();
        let free = model.integer_var("free").unwrap();
        model.add_constr("min_cell", c!(cell >= 100.0)).unwrap();
        model.add_constr("assembly", c!(0.2 * desk + 0.4 * cell <= 401.0)).unwrap();
        model.add_constr("painting", c!(0.5 * desk + 0.4 * cell <= 492.0)).unwrap();
        model.add_constr("link", c!(free >= desk)).unwrap();

        let rows = rows(&model).unwrap();
        let bounds = implied_bounds(&model, &rows);

        // painting with cell >= 100 leaves desk <= 904, assembly with desk >= 0 leaves cell <= 1002.5
        assert!((bounds[0].1 - 904.0).abs() < 1e-9);
        assert_eq!(bounds[1].0, 100.0);
        assert!((bounds[1].1 - 1002.5).abs() < 1e-9);
        // nothing limits `free` from above
        assert_eq!(bounds[2], (0.0, f64::INFINITY));
    }

    #[test]
    fn lp_with_constant_objective_term() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        let y = model.continuous_var("y").unwrap();
        model.add_constr("c", c!(x + 2.0 * y <= 4.0)).unwrap();
        model.add_constr("d", c!(x <= 3.0)).unwrap();
        model.set_objective(x + y + 10.0, Sense::Maximize).unwrap();

        let solution = model.solve().unwrap();
        assert!((solution.objective_value() - 13.5).abs() < 1e-6);
        assert!((solution.value(x).unwrap() - 3.0).abs() < 1e-6);
        assert!((solution.value(y).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unbounded_is_reported() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        model.add_constr("c", c!(x >= 1.0)).unwrap();
        model.set_objective(x, Sense::Maximize).unwrap();
        assert_eq!(model.solve().unwrap_err(), Error::Unbounded);
    }

    #[test]
    fn integer_values_are_whole() {
        let mut model = Model::new("t");
        let x = model.integer_var("x").unwrap();
        let y = model.integer_var("y").unwrap();
        model.add_constr("c", c!(2.0 * x + 2.0 * y <= 7.0)).unwrap();
        model.set_objective(x + 1.5 * y, Sense::Maximize).unwrap();

        let solution = model.solve().unwrap();
        let (xv, yv) = (solution.value(x).unwrap(), solution.value(y).unwrap());
        assert_eq!(xv.fract(), 0.0);
        assert_eq!(yv.fract(), 0.0);
        assert_eq!((xv, yv), (0.0, 3.0));
        assert!((solution.objective_value() - 4.5).abs() < 1e-6);
    }
}
