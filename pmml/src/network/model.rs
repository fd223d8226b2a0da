//! Compiled neural network

use super::extract::{NetworkTopology, NeuralNetworkRef};
use crate::compile::assemble;
use crate::error::Result;
use crate::function::ComposedFunction;
use crate::xml::Document;
use std::path::Path;

/// A network compiled out of its document
///
/// Owns everything it needs, so it outlives the document it was read from.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    name: String,
    input_names: Vec<String>,
    output_names: Vec<String>,
    topology: NetworkTopology,
    function: ComposedFunction,
}

impl NeuralNetwork {
    /// Compile the network named `name` (the first one when empty)
    pub fn from_document(doc: &Document, name: &str) -> Result<Self> {
        Self::compile(&doc.neural_network(name)?)
    }

    /// Read `path` and compile the network named `name`
    pub fn from_file(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        let doc = Document::from_file(path)?;
        Self::from_document(&doc, name)
    }

    pub fn compile(net: &NeuralNetworkRef<'_>) -> Result<Self> {
        Ok(Self {
            name: net.model_name().to_string(),
            input_names: net.input_names()?,
            output_names: net.output_names()?,
            topology: net.topology()?,
            function: assemble(net)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn function(&self) -> &ComposedFunction {
        &self.function
    }

    pub fn into_function(self) -> ComposedFunction {
        self.function
    }

    /// Evaluate the network on one raw input vector
    pub fn evaluate(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.function.evaluate(inputs)
    }
}
