//! Either/or constraints through a binary switch and big-M constants.
//!
//! `either_or` adds
//!
//! ```text
//!   e1 <= M1 * z
//!   e2 <= M2 * (1 - z)
//! ```
//!
//! so `e1 <= M1` is enforced when `z = 1` and `e2 <= M2` when `z = 0`. The other branch collapses
//! to `e <= 0`. Each `M` is passed in as a [`BigM`] so the value used stays visible in the
//! model data.
use super::expr::LinExpr;
use super::model::{ConstrIndex, Domain, Model, Var};
use super::{Error, Result};
use crate::c;

/// The limit a branch of a disjunction enforces while it is active.
///
/// Use the tightest known upper bound of the branch expression, typically the capacity the
/// branch models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BigM(f64);

impl BigM {
    pub fn new(value: f64) -> Result<BigM> {
        match value.is_finite() && value > 0.0 {
            true => Ok(BigM(value)),
            false => Err(Error::InvalidData(format!(
                "big-M must be positive and finite, got {}",
                value
            ))),
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Adds `when_one.0 <= M1 * z` and `when_zero.0 <= M2 * (1 - z)`. `z` must be binary.
///
/// The constraints are named `{name}_z1` and `{name}_z0`.
pub fn either_or(
    model: &mut Model,
    name: &str,
    z: Var,
    when_one: (LinExpr, BigM),
    when_zero: (LinExpr, BigM),
) -> Result<(ConstrIndex, ConstrIndex)> {
    if model.var(z)?.domain != Domain::Binary {
        return Err(Error::InvalidData(format!(
            "switch of disjunction {} must be binary",
            name
        )));
    }

    let (e1, m1) = when_one;
    let (e2, m2) = when_zero;
    let first = model.add_constr(&format!("{}_z1", name), c!(e1 <= m1.value() * z))?;
    let second = model.add_constr(&format!("{}_z0", name), c!(e2 <= m2.value() * (1.0 - z)))?;
    Ok((first, second))
}
