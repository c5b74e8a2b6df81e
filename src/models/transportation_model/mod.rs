pub mod model;
pub mod sets_and_parameters;

pub use model::{TransportationResult, TransportationSolver, Violation};
pub use sets_and_parameters::{
    Arc, ArcCosts, NodeIndex, Parameters, Sets, TransportationProblem, UndeclaredArcs,
};
