//! Symbolic functions produced from models
//!
//! Models compile to a [`ComposedFunction`]: a chain of [`FunctionStage`]s,
//! each holding one [`Expr`] per output. Expressions are plain trees over a
//! positional input vector, so a compiled function owns no document data.

pub mod activation;
pub mod expr;
pub mod stage;

pub use activation::Activation;
pub use expr::{BinaryOp, Expr, MathFn};
pub use stage::{ComposedFunction, FunctionStage};
