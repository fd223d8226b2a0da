//! Feed-forward neural networks
//!
//! [`NeuralNetworkRef`] reads topology and parameters straight from the
//! document; [`NeuralNetwork`] is the compiled, document-independent form.

pub mod extract;
pub mod model;
pub mod resolver;

pub use extract::{LayerTopology, NetworkTopology, NeuralNetworkRef, NormDescriptor};
pub use model::NeuralNetwork;
pub use resolver::IndexResolver;
