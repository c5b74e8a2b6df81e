use super::{implied_bounds, objective_coefficients, rows, Backend, SolveOptions};
use crate::lp::model::VarData;
use crate::lp::solution::TOLERANCE;
use crate::lp::{Cmp, Domain, Error, Model, Result, Sense, Solution};
use log::{info, trace};
use microlp::{ComparisonOp, OptimizationDirection, Problem};

/// Pure Rust simplex with branch-and-bound for integer columns.
///
/// microlp takes integer bounds as `i32`, so every integer column needs finite bounds in that
/// range. Bounds the rows imply are used when the declared ones are open; a model whose integer
/// columns stay unbounded is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLp;

/// Whole-number bounds of an integer column
fn integer_bounds(data: &VarData, (lb, ub): (f64, f64)) -> Result<(i32, i32)> {
    let (lb, ub) = ((lb - TOLERANCE).ceil(), (ub + TOLERANCE).floor());
    if lb > ub {
        return Err(Error::Infeasible);
    }
    if !lb.is_finite() || !ub.is_finite() {
        return Err(Error::Backend(format!(
            "microlp needs finite bounds on integer variable '{}', the model allows [{}, {}]",
            data.name, lb, ub
        )));
    }
    if lb < i32::MIN as f64 || ub > i32::MAX as f64 {
        return Err(Error::Backend(format!(
            "bounds [{}, {}] of integer variable '{}' do not fit microlp's i32 range",
            lb, ub, data.name
        )));
    }
    Ok((lb as i32, ub as i32))
}

impl Backend for MicroLp {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<Solution> {
        let direction = match model.sense() {
            Sense::Minimize => OptimizationDirection::Minimize,
            Sense::Maximize => OptimizationDirection::Maximize,
        };
        let mut problem = Problem::new(direction);

        let rows = rows(model)?;
        let bounds = implied_bounds(model, &rows);

        let (objective, constant) = objective_coefficients(model);
        let mut columns = Vec::with_capacity(model.vars().len());
        for ((data, coeff), implied) in model.vars().iter().zip(objective).zip(bounds) {
            let column = match data.domain {
                Domain::Continuous => problem.add_var(coeff, (data.lb, data.ub)),
                Domain::Binary if data.lb == 0.0 && data.ub == 1.0 => problem.add_binary_var(coeff),
                // binaries fixed with `set_bounds` and general integers
                Domain::Binary | Domain::Integer => {
                    problem.add_integer_var(coeff, integer_bounds(data, implied)?)
                }
            };
            columns.push(column);
        }

        if options.log_output {
            info!(
                "microlp: {} columns ({} integral), {} rows, {}",
                columns.len(),
                model.vars().iter().filter(|v| v.domain.is_integral()).count(),
                rows.len(),
                model.sense()
            );
        }

        for row in rows {
            trace!("microlp: row {} with {} terms", row.name, row.terms.len());
            let op = match row.cmp {
                Cmp::Le => ComparisonOp::Le,
                Cmp::Eq => ComparisonOp::Eq,
                Cmp::Ge => ComparisonOp::Ge,
            };
            problem.add_constraint(
                row.terms
                    .into_iter()
                    .map(|(var, coeff)| (columns[var.index()], coeff)),
                op,
                row.rhs,
            );
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(microlp::Error::Infeasible) => return Err(Error::Infeasible),
            Err(microlp::Error::Unbounded) => return Err(Error::Unbounded),
            Err(err) => return Err(Error::Backend(err.to_string())),
        };

        let objective = solution.objective() + constant;
        if options.log_output {
            info!("microlp: optimal objective {}", objective);
        }

        let values = solution.iter().map(|(_, value)| *value).collect();
        Solution::new(model, values, objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c;

    fn solve(model: &Model) -> Result<Solution> {
        MicroLp.solve(model, &SolveOptions::default())
    }

    #[test]
    fn open_integer_columns_get_bounds_from_rows() {
        let mut model = Model::new("t");
        let desk = model.integer_var("desk").unwrap();
        let cell = model.integer_var("cell").unwrap();
        model.add_constr("min_desk", c!(desk >= 100.0)).unwrap();
        model.add_constr("min_cell", c!(cell >= 100.0)).unwrap();
        model.add_constr("assembly", c!(0.2 * desk + 0.4 * cell <= 401.0)).unwrap();
        model.add_constr("painting", c!(0.5 * desk + 0.4 * cell <= 492.0)).unwrap();
        model.set_objective(12.0 * desk + 20.0 * cell, Sense::Maximize).unwrap();

        let solution = solve(&model).unwrap();
        assert_eq!(solution.value(desk).unwrap(), 303.0);
        assert_eq!(solution.value(cell).unwrap(), 851.0);
        assert!((solution.objective_value() - 20656.0).abs() < 1e-6);
    }

    #[test]
    fn bounds_outside_i32_are_rejected() {
        let mut model = Model::new("t");
        let x = model.integer_var_with_lb("x", 3e9).unwrap();
        model.add_constr("cap", c!(x <= 4e9)).unwrap();
        model.set_objective(x, Sense::Minimize).unwrap();
        assert!(matches!(solve(&model), Err(Error::Backend(_))));

        // a lower bound set through a row is not mistaken for infeasibility
        let mut model = Model::new("t");
        let x = model.integer_var("x").unwrap();
        model.add_constr("min", c!(x >= 3.0e9)).unwrap();
        model.set_objective(x, Sense::Minimize).unwrap();
        assert!(matches!(solve(&model), Err(Error::Backend(_))));
    }

    #[test]
    fn unbounded_integer_column_is_rejected() {
        let mut model = Model::new("t");
        let x = model.integer_var("x").unwrap();
        model.add_constr("min", c!(x >= 1.0)).unwrap();
        model.set_objective(x, Sense::Minimize).unwrap();
        let err = solve(&model).unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn fixed_binary_keeps_its_value() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        let z = model.binary_var("z").unwrap();
        let free = model.binary_var("free").unwrap();
        model.set_bounds(z, 1.0..1.0).unwrap();
        model.add_constr("cap", c!(x <= 10.0 * z)).unwrap();
        model.set_objective(x - free, Sense::Minimize).unwrap();

        let solution = solve(&model).unwrap();
        assert_eq!(solution.value(z).unwrap(), 1.0);
        assert_eq!(solution.value(free).unwrap(), 1.0);
        assert!((solution.objective_value() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn row_implied_infeasibility_is_reported() {
        let mut model = Model::new("t");
        let x = model.integer_var("x").unwrap();
        model.add_constr("low", c!(2.0 * x >= 3.0)).unwrap();
        model.add_constr("high", c!(2.0 * x <= 3.8)).unwrap();
        assert_eq!(solve(&model).unwrap_err(), Error::Infeasible);
    }
}
