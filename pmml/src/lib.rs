//! PMML model import and export.
//!
//! This crate reads feed-forward neural networks and linear regressions out
//! of PMML documents and compiles them into callable functions, and writes
//! linear regressions back into documents.
//!
//! ```no_run
//! use pmml_models::{Document, NeuralNetwork};
//!
//! # fn main() -> pmml_models::Result<()> {
//! let doc = Document::from_file("model.pmml")?;
//! for name in doc.neural_network_names() {
//!     let net = NeuralNetwork::from_document(&doc, &name)?;
//!     println!("{} -> {:?}", name, net.evaluate(&[1.0, 2.0])?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod compile;
pub mod config;
pub mod error;
pub mod function;
pub mod model;
pub mod network;
pub mod regression;
pub mod xml;

pub use config::PmmlConfig;
pub use error::{PmmlError, Result, ValidationError};
pub use function::{Activation, ComposedFunction, Expr, FunctionStage};
pub use model::{ModelCategory, ModelRef};
pub use network::{NetworkTopology, NeuralNetwork, NeuralNetworkRef, NormDescriptor};
pub use regression::{LinearModel, RegressionModel, RegressionModelRef};
pub use xml::{Document, Element, NodeId};
