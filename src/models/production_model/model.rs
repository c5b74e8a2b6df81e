use super::parameters::{MachineChoiceParameters, TelephoneParameters};
use crate::c;
use crate::lp::{either_or, Backend, Model, Result, Sense, Solution, SolveOptions, Var};
use derive_more::Constructor;
use log::info;

/// A model with one binary and one integer variable and nothing else, used to show how variable
/// domains appear in the model statistics.
pub fn domain_showcase() -> Result<Model> {
    let mut model = Model::new("integer_programming");
    model.binary_var("boolean_var")?;
    model.integer_var("int_var")?;
    Ok(model)
}

#[derive(Debug, Clone, Copy, Constructor)]
pub struct TelephoneVariables {
    pub desk: Var,
    pub cell: Var,
}

/// Solved production of the telephone problem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelephonePlan {
    pub desk: f64,
    pub cell: f64,
    pub profit: f64,
}

pub struct TelephoneModel {}

impl TelephoneModel {
    /// builds the integer telephone production model
    pub fn build(parameters: &TelephoneParameters) -> Result<(Model, TelephoneVariables)> {
        info!("Building telephone production model");
        let mut model = Model::new("ip_telephone_production");

        let desk = model.integer_var("desk")?;
        let cell = model.integer_var("cell")?;

        // minimum production
        model.add_constr("min_desk", c!(desk >= parameters.min_desk))?;
        model.add_constr("min_cell", c!(cell >= parameters.min_cell))?;

        // assembly and painting time limits
        let assembly = &parameters.assembly;
        model.add_constr("assembly", c!(assembly.usage(desk, cell) <= assembly.limit))?;
        let painting = &parameters.painting;
        model.add_constr("painting", c!(painting.usage(desk, cell) <= painting.limit))?;

        model.set_objective(
            parameters.desk_profit * desk + parameters.cell_profit * cell,
            Sense::Maximize,
        )?;

        Ok((model, TelephoneVariables::new(desk, cell)))
    }

    pub fn solve(
        parameters: &TelephoneParameters,
        backend: &dyn Backend,
        options: &SolveOptions,
    ) -> Result<TelephonePlan> {
        let (model, vars) = TelephoneModel::build(parameters)?;
        let solution = model.solve_with(backend, options)?;
        TelephonePlan::new(&vars, &solution)
    }
}

impl TelephonePlan {
    pub fn new(vars: &TelephoneVariables, solution: &Solution) -> Result<TelephonePlan> {
        Ok(TelephonePlan {
            desk: solution.value(vars.desk)?,
            cell: solution.value(vars.cell)?,
            profit: solution.objective_value(),
        })
    }
}

#[derive(Debug, Clone, Copy, Constructor)]
pub struct MachineChoiceVariables {
    pub desk: Var,
    pub cell: Var,
    /// production on machine A
    pub desk_a: Var,
    pub cell_a: Var,
    /// production on machine B
    pub desk_b: Var,
    pub cell_b: Var,
    /// 1 if machine A is used, 0 if machine B is used
    pub z: Var,
}

/// Solved production of the machine choice problem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineChoicePlan {
    pub desk: f64,
    pub cell: f64,
    pub desk_a: f64,
    pub cell_a: f64,
    pub desk_b: f64,
    pub cell_b: f64,
    pub uses_machine_a: bool,
    pub profit: f64,
}

pub struct MachineChoiceModel {}

impl MachineChoiceModel {
    pub fn build(parameters: &MachineChoiceParameters) -> Result<(Model, MachineChoiceVariables)> {
        MachineChoiceModel::build_with_choice(parameters, None)
    }

    /// Builds the model. `Some(true)` forces machine A (`z = 1`), `Some(false)` forces machine B.
    pub fn build_with_choice(
        parameters: &MachineChoiceParameters,
        machine_a: Option<bool>,
    ) -> Result<(Model, MachineChoiceVariables)> {
        info!("Building machine choice model (forced choice: {:?})", machine_a);
        let mut model = Model::new("decision_phone");

        //*************CREATE VARIABLES*************//
        let desk = model.integer_var_with_lb("desk", parameters.min_desk)?;
        let cell = model.continuous_var_with_lb("cell", parameters.min_cell)?;
        let desk_a = model.integer_var("desk1")?;
        let cell_a = model.integer_var("cell1")?;
        let desk_b = model.integer_var("desk2")?;
        let cell_b = model.integer_var("cell2")?;
        let z = model.binary_var("z")?;

        if let Some(use_a) = machine_a {
            let fixed = if use_a { 1.0 } else { 0.0 };
            model.set_bounds(z, fixed..fixed)?;
        }

        // ******************** ADD CONSTRAINTS ********************
        // total production is split over the two machines
        model.add_constr("split_desk", c!(desk == desk_a + desk_b))?;
        model.add_constr("split_cell", c!(cell == cell_a + cell_b))?;

        // assembly on machine A when z = 1, on machine B when z = 0. Each big-M is the
        // machine's own capacity.
        let (a, b) = (&parameters.machine_a, &parameters.machine_b);
        either_or(
            &mut model,
            "assembly",
            z,
            (a.usage(desk_a, cell_a), a.big_m()?),
            (b.usage(desk_b, cell_b), b.big_m()?),
        )?;

        // painting limit, independent of the machine
        let painting = &parameters.painting;
        model.add_constr("painting", c!(painting.usage(desk, cell) <= painting.limit))?;

        model.set_objective(
            parameters.desk_profit * desk + parameters.cell_profit * cell,
            Sense::Maximize,
        )?;

        let vars = MachineChoiceVariables::new(desk, cell, desk_a, cell_a, desk_b, cell_b, z);
        Ok((model, vars))
    }

    pub fn solve(
        parameters: &MachineChoiceParameters,
        machine_a: Option<bool>,
        backend: &dyn Backend,
        options: &SolveOptions,
    ) -> Result<MachineChoicePlan> {
        let (model, vars) = MachineChoiceModel::build_with_choice(parameters, machine_a)?;
        let solution = model.solve_with(backend, options)?;
        MachineChoicePlan::new(&vars, &solution)
    }
}

impl MachineChoicePlan {
    pub fn new(vars: &MachineChoiceVariables, solution: &Solution) -> Result<MachineChoicePlan> {
        Ok(MachineChoicePlan {
            desk: solution.value(vars.desk)?,
            cell: solution.value(vars.cell)?,
            desk_a: solution.value(vars.desk_a)?,
            cell_a: solution.value(vars.cell_a)?,
            desk_b: solution.value(vars.desk_b)?,
            cell_b: solution.value(vars.cell_b)?,
            uses_machine_a: solution.value(vars.z)? > 0.5,
            profit: solution.objective_value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::default_backend;
    use crate::models::production_model::Resource;

    const EPS: f64 = 1e-6;

    fn solve_telephone(parameters: &TelephoneParameters) -> TelephonePlan {
        TelephoneModel::solve(parameters, default_backend().as_ref(), &SolveOptions::default())
            .unwrap()
    }

    fn solve_choice(parameters: &MachineChoiceParameters, choice: Option<bool>) -> MachineChoicePlan {
        MachineChoiceModel::solve(
            parameters,
            choice,
            default_backend().as_ref(),
            &SolveOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn showcase_has_one_binary_and_one_integer() {
        let info = domain_showcase().unwrap().info();
        assert_eq!((info.binary, info.integer, info.continuous), (1, 1, 0));
        assert_eq!(info.constraints(), 0);
    }

    #[test]
    fn telephone_plan_is_integral_and_feasible() {
        let parameters = TelephoneParameters::default();
        let plan = solve_telephone(&parameters);

        assert_eq!(plan.desk.fract(), 0.0);
        assert_eq!(plan.cell.fract(), 0.0);
        assert!(plan.desk >= 100.0);
        assert!(plan.cell >= 100.0);
        assert!(0.2 * plan.desk + 0.4 * plan.cell <= 401.0 + EPS);
        assert!(0.5 * plan.desk + 0.4 * plan.cell <= 492.0 + EPS);

        // d + 2c <= 2005 and 5d + 4c <= 4920 leave (303, 851) as the best integer point
        assert!((plan.profit - 20656.0).abs() < 1e-6);
        assert_eq!((plan.desk, plan.cell), (303.0, 851.0));
    }

    #[test]
    fn telephone_model_has_four_constraints() {
        let (model, _) = TelephoneModel::build(&TelephoneParameters::default()).unwrap();
        let info = model.info();
        assert_eq!((info.le, info.ge, info.eq), (2, 2, 0));
        assert_eq!(info.integer, 2);
    }

    #[test]
    fn machine_a_forced() {
        let plan = solve_choice(&MachineChoiceParameters::default(), Some(true));

        assert!(plan.uses_machine_a);
        // machine B is switched off entirely
        assert_eq!((plan.desk_b, plan.cell_b), (0.0, 0.0));
        // machine A's own limit applies
        assert!(0.2 * plan.desk_a + 0.4 * plan.cell_a <= 400.0 + EPS);
        assert_eq!(plan.desk, plan.desk_a);
        assert!((plan.cell - plan.cell_a).abs() < 1e-6);
        assert!((plan.profit - 18700.0).abs() < 1e-6);
    }

    #[test]
    fn machine_b_forced() {
        let plan = solve_choice(&MachineChoiceParameters::default(), Some(false));

        assert!(!plan.uses_machine_a);
        assert_eq!((plan.desk_a, plan.cell_a), (0.0, 0.0));
        assert!(0.25 * plan.desk_b + 0.3 * plan.cell_b <= 430.0 + EPS);
        assert_eq!(plan.desk, plan.desk_b);
        assert!((plan.cell - plan.cell_b).abs() < 1e-6);
        assert!((plan.profit - 18700.0).abs() < 1e-6);
    }

    #[test]
    fn free_choice_respects_painting() {
        let plan = solve_choice(&MachineChoiceParameters::default(), None);

        assert!(plan.desk >= 100.0 && plan.cell >= 100.0 - EPS);
        assert!(0.5 * plan.desk + 0.4 * plan.cell <= 400.0 + EPS);
        // painting binds: d = 100, c = 875 whichever machine assembles
        assert!((plan.profit - 18700.0).abs() < 1e-6);
    }

    #[test]
    fn free_choice_picks_the_better_machine() {
        // with painting out of the way, machine B's faster cell phone assembly wins
        let mut parameters = MachineChoiceParameters::default();
        parameters.painting = Resource::new(0.5, 0.4, 10_000.0);

        let plan = solve_choice(&parameters, None);
        assert!(!plan.uses_machine_a);
        assert!((plan.profit - 28200.0).abs() < 1e-6);

        let forced_a = solve_choice(&parameters, Some(true));
        assert!((forced_a.profit - 23600.0).abs() < 1e-6);
    }
}
