use clap::{ArgEnum, Parser};
use log::{error, info};
use std::process::exit;

use ormodels::lp::{self, default_backend, Backend, SolveOptions};
use ormodels::models::production_model::{
    domain_showcase, MachineChoiceModel, MachineChoiceParameters, MachineChoicePlan,
    TelephoneModel, TelephoneParameters, TelephonePlan,
};
use ormodels::models::transportation_model::{
    Parameters, Sets, TransportationProblem, TransportationResult, TransportationSolver,
    UndeclaredArcs,
};
use ormodels::piecewise::{example_breakpoints, example_slopes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
enum Run {
    All,
    Transportation,
    Piecewise,
    Integer,
    MachineChoice,
}

/// Small operations research models solved with a linear programming backend
#[derive(Parser, Debug)]
#[clap(version)]
struct Config {
    /// Which model(s) to run
    #[clap(long, arg_enum, default_value = "all")]
    run: Run,
    /// JSON file with a transportation instance, replacing the built-in one
    #[clap(long)]
    instance: Option<String>,
    /// Let the backend print its own log
    #[clap(long)]
    log_output: bool,
    /// Close (source, target) pairs without a declared cost instead of treating them as free
    #[clap(long)]
    forbid_undeclared_arcs: bool,
}

impl Config {
    fn runs(&self, run: Run) -> bool {
        self.run == Run::All || self.run == run
    }
}

fn transportation(config: &Config, backend: &dyn Backend, options: &SolveOptions) -> lp::Result<()> {
    let mut problem = match &config.instance {
        Some(path) => {
            info!("Reading transportation instance {}", path);
            let json = std::fs::read_to_string(path)
                .map_err(|err| lp::Error::InvalidData(format!("{}: {}", path, err)))?;
            TransportationProblem::from_json(&json)?
        }
        None => TransportationProblem::example(),
    };
    if config.forbid_undeclared_arcs {
        problem.undeclared_arcs = UndeclaredArcs::Forbidden;
    }
    problem.validate()?;

    let sets = Sets::new(&problem);
    let parameters = Parameters::new(&problem);
    let (model, vars) = TransportationSolver::build(&sets, &parameters)?;
    println!("{}", model.info());

    let solution = model.solve_with(backend, options)?;
    println!("{}", solution.report());

    let result = TransportationResult::new(&sets, &vars, &solution)?;
    let violations = result.violations(&parameters);
    match violations.is_empty() {
        true => println!("flow respects every capacity and demand"),
        false => violations.iter().for_each(|v| println!("violation: {}", v)),
    }
    Ok(())
}

fn piecewise() -> lp::Result<()> {
    let by_slopes = example_slopes()?;
    let by_breaks = example_breakpoints()?;

    println!("{:>8} {:>10} {:>10}", "x", "slopes", "breaks");
    for (x, y) in by_slopes.sample(-1.0, 4000.0)? {
        println!("{:>8} {:>10.3} {:>10.3}", x, y, by_breaks.evaluate(x));
    }
    println!("slopes: {:?}", by_breaks.slopes());
    Ok(())
}

fn integer(backend: &dyn Backend, options: &SolveOptions) -> lp::Result<()> {
    println!("{}", domain_showcase()?.info());

    let (model, vars) = TelephoneModel::build(&TelephoneParameters::default())?;
    println!("{}", model.info());
    let solution = model.solve_with(backend, options)?;
    println!("{}", solution.report());

    let plan = TelephonePlan::new(&vars, &solution)?;
    info!("desk = {}, cell = {}, profit = {}", plan.desk, plan.cell, plan.profit);
    Ok(())
}

fn machine_choice(backend: &dyn Backend, options: &SolveOptions) -> lp::Result<()> {
    let parameters = MachineChoiceParameters::default();
    let (model, vars) = MachineChoiceModel::build(&parameters)?;
    println!("{}", model.info());
    let solution = model.solve_with(backend, options)?;
    println!("{}", solution.report());

    let plan = MachineChoicePlan::new(&vars, &solution)?;
    println!(
        "assembly on machine {}",
        if plan.uses_machine_a { "A" } else { "B" }
    );

    // profit of each branch on its own
    for machine_a in [true, false] {
        let forced = MachineChoiceModel::solve(&parameters, Some(machine_a), backend, options)?;
        info!(
            "z = {}: desk = {}, cell = {}, profit = {}",
            machine_a as u8, forced.desk, forced.cell, forced.profit
        );
    }
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let backend = default_backend();
    let options = SolveOptions::with_log_output(config.log_output);
    info!("Using the {} backend", backend.name());

    let mut failed = 0;
    let mut report = |name: &str, result: lp::Result<()>| {
        if let Err(err) = result {
            error!("{} failed: {}", name, err);
            failed += 1;
        }
    };

    if config.runs(Run::Transportation) {
        report(
            "transportation",
            transportation(&config, backend.as_ref(), &options),
        );
    }
    if config.runs(Run::Piecewise) {
        report("piecewise", piecewise());
    }
    if config.runs(Run::Integer) {
        report("integer", integer(backend.as_ref(), &options));
    }
    if config.runs(Run::MachineChoice) {
        report("machine choice", machine_choice(backend.as_ref(), &options));
    }

    if failed > 0 {
        exit(1);
    }
}
