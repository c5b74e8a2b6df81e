//! A small linear/mixed-integer modeling layer.
//!
//! Variables, linear expressions, constraints and an objective are collected in a [`Model`],
//! which is then handed to a [`Backend`](backend::Backend) for solving. No solving happens here.
pub mod backend;
pub mod disjunction;
pub mod expr;
pub mod model;
pub mod solution;

pub use backend::{default_backend, Backend, SolveOptions};
pub use disjunction::{either_or, BigM};
pub use expr::{Cmp, Constraint, LinExpr, LinSum};
pub use model::{ConstrIndex, Domain, Model, ModelInfo, Sense, Var};
pub use solution::{Solution, SolutionReport};

use derive_more::Display;

/// Errors raised while building or solving a model.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum Error {
    /// A variable created by another model was used in this one
    #[display(fmt = "variable {} does not belong to model '{}'", var, model)]
    ForeignVariable { var: String, model: String },
    /// The bounds of a variable are empty or do not fit its domain
    #[display(fmt = "invalid bounds [{}, {}] for {} variable '{}'", lb, ub, domain, name)]
    InvalidBounds {
        name: String,
        domain: Domain,
        lb: f64,
        ub: f64,
    },
    /// A coefficient or right-hand side is NaN or infinite
    #[display(fmt = "non-finite coefficient in '{}'", _0)]
    NonFinite(String),
    /// Model data referenced a node, arc or parameter that does not exist
    #[display(fmt = "invalid model data: {}", _0)]
    InvalidData(String),
    #[display(fmt = "model is infeasible")]
    Infeasible,
    #[display(fmt = "model is unbounded")]
    Unbounded,
    /// The solver itself failed
    #[display(fmt = "solver error: {}", _0)]
    Backend(String),
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
