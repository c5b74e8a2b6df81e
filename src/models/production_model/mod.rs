pub mod model;
pub mod parameters;

pub use model::{
    domain_showcase, MachineChoiceModel, MachineChoicePlan, TelephoneModel, TelephonePlan,
};
pub use parameters::{MachineChoiceParameters, Resource, TelephoneParameters};
