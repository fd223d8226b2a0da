//! Model enumeration and lookup
//!
//! A model reference borrows the document it was found in: the borrow
//! checker guarantees it cannot outlive the document nor survive a mutation
//! (mutations need `&mut Document`).

use crate::error::{PmmlError, Result};
use crate::network::NeuralNetworkRef;
use crate::regression::RegressionModelRef;
use crate::xml::{Document, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model kinds this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelCategory {
    NeuralNetwork,
    Regression,
}

impl ModelCategory {
    /// Element tag of this model kind
    pub fn tag(&self) -> &'static str {
        match self {
            ModelCategory::NeuralNetwork => "NeuralNetwork",
            ModelCategory::Regression => "RegressionModel",
        }
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Non-owning handle on a model element plus its cached name
#[derive(Debug, Clone)]
pub struct ModelRef<'doc> {
    doc: &'doc Document,
    node: NodeId,
    name: String,
}

impl<'doc> ModelRef<'doc> {
    pub(crate) fn new(doc: &'doc Document, node: NodeId) -> Self {
        let name = doc
            .get_attribute(node, "modelName")
            .unwrap_or_default()
            .to_string();
        Self { doc, node, name }
    }

    pub fn document(&self) -> &'doc Document {
        self.doc
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn model_name(&self) -> &str {
        &self.name
    }
}

impl Document {
    fn model_elements(&self, category: ModelCategory) -> impl Iterator<Item = NodeId> + '_ {
        let root = self.root();
        self.child_elements(root)
            .filter(move |&id| self.has_tag(id, category.tag()))
    }

    /// `modelName` of every model of `category`, in document order
    ///
    /// Models without a name contribute an empty string.
    pub fn model_names(&self, category: ModelCategory) -> Vec<String> {
        self.model_elements(category)
            .map(|id| self.get_attribute(id, "modelName").unwrap_or_default().to_string())
            .collect()
    }

    pub fn number_of_models(&self, category: ModelCategory) -> usize {
        self.model_elements(category).count()
    }

    /// Locate a model by name; an empty name selects the first model
    pub fn find_model(&self, category: ModelCategory, name: &str) -> Result<ModelRef<'_>> {
        let found = if name.is_empty() {
            self.model_elements(category).next()
        } else {
            self.model_elements(category)
                .find(|&id| self.get_attribute(id, "modelName") == Some(name))
        };
        found
            .map(|node| ModelRef::new(self, node))
            .ok_or_else(|| PmmlError::ModelNotFound {
                category,
                name: name.to_string(),
                available: self.model_names(category),
            })
    }

    pub fn number_of_neural_networks(&self) -> usize {
        self.number_of_models(ModelCategory::NeuralNetwork)
    }

    pub fn neural_network_names(&self) -> Vec<String> {
        self.model_names(ModelCategory::NeuralNetwork)
    }

    /// Neural network named `name`, or the first one when `name` is empty
    pub fn neural_network(&self, name: &str) -> Result<NeuralNetworkRef<'_>> {
        self.find_model(ModelCategory::NeuralNetwork, name)
            .map(NeuralNetworkRef::new)
    }

    pub fn number_of_regression_models(&self) -> usize {
        self.number_of_models(ModelCategory::Regression)
    }

    pub fn regression_model_names(&self) -> Vec<String> {
        self.model_names(ModelCategory::Regression)
    }

    /// Regression model named `name`, or the first one when `name` is empty
    pub fn regression_model(&self, name: &str) -> Result<RegressionModelRef<'_>> {
        self.find_model(ModelCategory::Regression, name)
            .map(RegressionModelRef::new)
    }
}
