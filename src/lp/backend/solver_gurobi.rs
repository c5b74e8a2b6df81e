use super::{objective_coefficients, rows, Backend, SolveOptions};
use crate::lp::{Cmp, Domain, Error, Model, Result, Sense, Solution};
use grb::expr::LinExpr as GrbLinExpr;
use grb::{attr, c, param, ModelSense, Status, VarType};
use log::{info, warn};

/// The Gurobi optimizer, driven through the `grb` bindings
#[derive(Debug, Clone, Default)]
pub struct Gurobi {
    /// Time limit in seconds, if any
    pub time_limit: Option<f64>,
}

impl From<grb::Error> for Error {
    fn from(err: grb::Error) -> Self {
        Error::Backend(format!("{:?}", err))
    }
}

impl Backend for Gurobi {
    fn name(&self) -> &'static str {
        "gurobi"
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Result<Solution> {
        let mut grb_model = grb::Model::new(model.name())?;
        grb_model.set_param(param::OutputFlag, options.log_output as i32)?;
        // distinguish infeasible from unbounded instead of reporting InfOrUnbd
        grb_model.set_param(param::DualReductions, 0)?;
        if let Some(limit) = self.time_limit {
            grb_model.set_param(param::TimeLimit, limit)?;
        }

        //*************CREATE VARIABLES*************//
        let mut columns = Vec::with_capacity(model.vars().len());
        for data in model.vars() {
            let vtype = match data.domain {
                Domain::Continuous => VarType::Continuous,
                Domain::Integer => VarType::Integer,
                Domain::Binary => VarType::Binary,
            };
            columns.push(grb_model.add_var(
                &data.name,
                vtype,
                0.0,
                data.lb,
                data.ub,
                std::iter::empty(),
            )?);
        }
        grb_model.update()?;

        // ******************** ADD CONSTRAINTS ********************
        for row in rows(model)? {
            let mut lhs = GrbLinExpr::new();
            for (var, coeff) in row.terms {
                lhs.add_term(coeff, columns[var.index()]);
            }
            let rhs = row.rhs;
            let ineq = match row.cmp {
                Cmp::Le => c!(lhs <= rhs),
                Cmp::Eq => c!(lhs == rhs),
                Cmp::Ge => c!(lhs >= rhs),
            };
            grb_model.add_constr(row.name, ineq)?;
        }

        let (coeffs, constant) = objective_coefficients(model);
        let mut objective = GrbLinExpr::new();
        for (var, coeff) in columns.iter().zip(coeffs) {
            objective.add_term(coeff, *var);
        }
        objective.add_constant(constant);
        let sense = match model.sense() {
            Sense::Minimize => ModelSense::Minimize,
            Sense::Maximize => ModelSense::Maximize,
        };
        grb_model.set_objective(objective, sense)?;
        grb_model.update()?;

        grb_model.optimize()?;

        match grb_model.status()? {
            Status::Optimal => (),
            Status::Infeasible => return Err(Error::Infeasible),
            Status::Unbounded | Status::InfOrUnbd => return Err(Error::Unbounded),
            other => {
                warn!("gurobi stopped with status {:?}", other);
                return Err(Error::Backend(format!("no optimal solution: {:?}", other)));
            }
        }

        let mut values = Vec::with_capacity(columns.len());
        for var in &columns {
            values.push(grb_model.get_obj_attr(attr::X, var)?);
        }
        let objective = grb_model.get_attr(attr::ObjVal)?;
        if options.log_output {
            info!("gurobi: optimal objective {}", objective);
        }

        Solution::new(model, values, objective)
    }
}
