pub mod lp;
pub mod models;
pub mod piecewise;
