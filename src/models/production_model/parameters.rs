use crate::lp::{BigM, LinExpr, Result};
use derive_more::Constructor;

/// A resource shared by desk and cell phone production: hours per unit of each product and the
/// hours available.
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct Resource {
    pub desk_hours: f64,
    pub cell_hours: f64,
    pub limit: f64,
}

impl Resource {
    /// Hours used when producing `desk` desk phones and `cell` cell phones
    pub fn usage(&self, desk: impl Into<LinExpr>, cell: impl Into<LinExpr>) -> LinExpr {
        let (desk, cell): (LinExpr, LinExpr) = (desk.into(), cell.into());
        self.desk_hours * desk + self.cell_hours * cell
    }

    /// The limit as the big-M of a disjunction branch. Production on the resource can never use
    /// more than its limit, so this is the tightest valid constant.
    pub fn big_m(&self) -> Result<BigM> {
        BigM::new(self.limit)
    }
}

/// The integer telephone production problem
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct TelephoneParameters {
    pub desk_profit: f64,
    pub cell_profit: f64,
    /// Minimum number of desk phones
    pub min_desk: f64,
    /// Minimum number of cell phones
    pub min_cell: f64,
    pub assembly: Resource,
    pub painting: Resource,
}

impl Default for TelephoneParameters {
    fn default() -> Self {
        TelephoneParameters {
            desk_profit: 12.0,
            cell_profit: 20.0,
            min_desk: 100.0,
            min_cell: 100.0,
            assembly: Resource::new(0.2, 0.4, 401.0),
            painting: Resource::new(0.5, 0.4, 492.0),
        }
    }
}

/// Telephone production with a choice between two assembly machines
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct MachineChoiceParameters {
    pub desk_profit: f64,
    pub cell_profit: f64,
    pub min_desk: f64,
    pub min_cell: f64,
    /// The existing assembly machine, used when `z = 1`
    pub machine_a: Resource,
    /// The new assembly machine, used when `z = 0`
    pub machine_b: Resource,
    pub painting: Resource,
}

impl Default for MachineChoiceParameters {
    fn default() -> Self {
        MachineChoiceParameters {
            desk_profit: 12.0,
            cell_profit: 20.0,
            min_desk: 100.0,
            min_cell: 100.0,
            machine_a: Resource::new(0.2, 0.4, 400.0),
            // cell phones take 18 minutes instead of 24, desk phones 15 instead of 12
            machine_b: Resource::new(0.25, 0.3, 430.0),
            painting: Resource::new(0.5, 0.4, 400.0),
        }
    }
}
