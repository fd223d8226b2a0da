//! Linear regression models
//!
//! [`RegressionModelRef`] validates and reads a `RegressionModel` element in
//! place; [`RegressionModel`] and [`LinearModel`] are the owned forms used
//! for evaluation and export.

pub mod extract;
pub mod model;

pub use extract::RegressionModelRef;
pub use model::{LinearModel, RegressionModel};
