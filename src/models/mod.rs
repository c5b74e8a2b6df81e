pub mod production_model;
pub mod transportation_model;
pub mod utils;

pub use production_model::{MachineChoiceModel, TelephoneModel};
pub use transportation_model::TransportationSolver;
