//! Read access to a `NeuralNetwork` element
//!
//! Extraction is lenient in the same places the format is loose: a layer
//! whose `Neuron` count disagrees with its declared `numberOfNeurons` yields
//! zero biases and no resolved ids, missing connections read as weight 0,
//! and unparsable numbers read as 0. Nothing here fails on content; errors
//! only come from the query layer.

use super::resolver::IndexResolver;
use crate::compile::normalization::{diagnose_shapes, NormalizationSide};
use crate::error::{PmmlError, Result};
use crate::function::Activation;
use crate::model::ModelRef;
use crate::xml::query::{parse_index, parse_real};
use crate::xml::{Document, NodeId};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Largest input, output, layer or neuron count a network may declare
pub const MAX_DECLARED_COUNT: usize = 1 << 20;

/// Linear normalization of one variable: `orig0 -> norm0`, `orig1 -> norm1`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormDescriptor {
    pub orig0: f64,
    pub orig1: f64,
    pub norm0: f64,
    pub norm1: f64,
}

impl NormDescriptor {
    pub fn new(orig0: f64, orig1: f64, norm0: f64, norm1: f64) -> Self {
        Self {
            orig0,
            orig1,
            norm0,
            norm1,
        }
    }
}

/// Serializable snapshot of a network's structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub model_name: String,
    pub number_of_inputs: usize,
    pub number_of_outputs: usize,
    pub number_of_layers: usize,
    pub layers: Vec<LayerTopology>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTopology {
    pub size: usize,
    pub activation: String,
    pub neuron_ids: Vec<usize>,
}

/// Borrowed view of one `NeuralNetwork` element
///
/// Layer indices are 0-based; layer 0 is fed by the network inputs.
#[derive(Debug, Clone)]
pub struct NeuralNetworkRef<'doc> {
    model: ModelRef<'doc>,
}

impl<'doc> NeuralNetworkRef<'doc> {
    pub(crate) fn new(model: ModelRef<'doc>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn document(&self) -> &'doc Document {
        self.model.document()
    }

    pub fn node(&self) -> NodeId {
        self.model.node()
    }

    fn layer_path(layer: usize) -> String {
        format!("NeuralLayer[{}]", layer + 1)
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Declared count read from `pattern`, bounded by [`MAX_DECLARED_COUNT`]
    fn declared_count(&self, pattern: &str) -> Result<usize> {
        let count = self.document().query_unsigned(self.node(), pattern)?;
        if count > MAX_DECLARED_COUNT {
            return Err(PmmlError::InvalidArgument(format!(
                "network '{}' declares {} for '{}', more than the supported {}",
                self.model_name(),
                count,
                pattern,
                MAX_DECLARED_COUNT
            )));
        }
        Ok(count)
    }

    pub fn number_of_inputs(&self) -> Result<usize> {
        self.declared_count("NeuralInputs/@numberOfInputs")
    }

    pub fn number_of_outputs(&self) -> Result<usize> {
        self.declared_count("NeuralOutputs/@numberOfOutputs")
    }

    /// Declared `numberOfLayers` (hidden layers plus the output layer)
    pub fn number_of_layers(&self) -> Result<usize> {
        self.declared_count("@numberOfLayers")
    }

    /// Declared `numberOfNeurons` of a layer, 0 if the layer does not exist
    pub fn layer_size(&self, layer: usize) -> Result<usize> {
        self.declared_count(&format!("{}/@numberOfNeurons", Self::layer_path(layer)))
    }

    /// Field name of the `NeuralInput` with the given id, empty if unknown
    pub fn neural_input_name(&self, id: usize) -> Result<String> {
        self.document().query_string(
            self.node(),
            &format!("NeuralInputs/NeuralInput[@id='{}']/*/*/@field", id),
        )
    }

    /// Field names of the inputs in document order
    ///
    /// Falls back to `x0..x{n-1}` when the inputs do not all name a field.
    pub fn input_names(&self) -> Result<Vec<String>> {
        self.field_names("NeuralInputs/NeuralInput", self.number_of_inputs()?)
    }

    /// Field names of the outputs in document order, same fallback as inputs
    pub fn output_names(&self) -> Result<Vec<String>> {
        self.field_names("NeuralOutputs/NeuralOutput", self.number_of_outputs()?)
    }

    fn field_names(&self, pattern: &str, expected: usize) -> Result<Vec<String>> {
        let doc = self.document();
        let mut names = Vec::with_capacity(expected);
        for entry in doc.select_elements(self.node(), pattern)? {
            let name = doc.query_string(entry, "*/*/@field")?;
            if name.is_empty() {
                break;
            }
            names.push(name);
        }
        if names.len() != expected {
            names = (0..expected).map(|k| format!("x{}", k)).collect();
        }
        Ok(names)
    }

    /// Neuron ids of a layer in document order
    ///
    /// Empty when the number of `Neuron` elements differs from the declared
    /// layer size.
    pub fn neuron_ids(&self, layer: usize) -> Result<Vec<usize>> {
        let size = self.layer_size(layer)?;
        let ids = self.document().select_values(
            self.node(),
            &format!("{}/Neuron/@id", Self::layer_path(layer)),
        )?;
        if ids.is_empty() || ids.len() != size {
            return Ok(Vec::new());
        }
        Ok(ids.iter().map(|id| parse_index(id)).collect())
    }

    /// Raw `activationFunction` of a layer
    ///
    /// A layer without the attribute inherits the network-level value.
    pub fn activation_tag(&self, layer: usize) -> Result<String> {
        let doc = self.document();
        let tag = doc.query_string(
            self.node(),
            &format!("{}/@activationFunction", Self::layer_path(layer)),
        )?;
        if !tag.is_empty() {
            return Ok(tag);
        }
        doc.query_string(self.node(), "@activationFunction")
    }

    /// Decoded activation of a layer; unknown tags decode to identity
    pub fn activation(&self, layer: usize) -> Result<Activation> {
        Ok(Activation::from_tag(&self.activation_tag(layer)?))
    }

    pub fn topology(&self) -> Result<NetworkTopology> {
        let number_of_layers = self.number_of_layers()?;
        let layers = (0..number_of_layers)
            .map(|layer| {
                Ok(LayerTopology {
                    size: self.layer_size(layer)?,
                    activation: self.activation_tag(layer)?,
                    neuron_ids: self.neuron_ids(layer)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(NetworkTopology {
            model_name: self.model_name().to_string(),
            number_of_inputs: self.number_of_inputs()?,
            number_of_outputs: self.number_of_outputs()?,
            number_of_layers,
            layers,
        })
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Biases of a layer, one per declared neuron, in `Neuron` document order
    ///
    /// All zero when the number of biases differs from the layer size.
    pub fn bias(&self, layer: usize) -> Result<Array1<f64>> {
        let size = self.layer_size(layer)?;
        let mut bias = Array1::zeros(size);
        let values = self.document().select_values(
            self.node(),
            &format!("{}/Neuron/@bias", Self::layer_path(layer)),
        )?;
        if !values.is_empty() && values.len() == size {
            for (slot, value) in bias.iter_mut().zip(&values) {
                *slot = parse_real(value);
            }
        }
        Ok(bias)
    }

    /// Weight matrix of a layer with shape `(size(layer - 1), size(layer))`
    ///
    /// Rows follow the previous layer's neurons (the network inputs for
    /// layer 0) and columns this layer's neurons, both in id-resolved order.
    /// A layer past the last one, or one where either side has no resolved
    /// ids, yields an empty `0 x 0` matrix.
    pub fn weights(&self, layer: usize) -> Result<Array2<f64>> {
        let empty = || Array2::zeros((0, 0));

        let (from_size, from) = if layer == 0 {
            let n = self.number_of_inputs()?;
            (n, IndexResolver::sequential(n))
        } else if layer < self.number_of_layers()? {
            let ids = self.neuron_ids(layer - 1)?;
            (self.layer_size(layer - 1)?, IndexResolver::from_ids(&ids))
        } else {
            return Ok(empty());
        };
        let to_size = self.layer_size(layer)?;
        let to = IndexResolver::from_ids(&self.neuron_ids(layer)?);
        if from.is_empty() || to.is_empty() {
            return Ok(empty());
        }

        let doc = self.document();
        let mut weights = Array2::zeros((from_size, to_size));
        let neurons =
            doc.select_elements(self.node(), &format!("{}/Neuron", Self::layer_path(layer)))?;
        if neurons.len() != to_size {
            return Ok(weights);
        }

        for neuron in neurons {
            let to_id = doc.get_attribute(neuron, "id").map(parse_index).unwrap_or(0);
            let Some(column) = to.resolve(to_id) else {
                continue;
            };
            for con in doc.child_elements(neuron).filter(|&c| doc.has_tag(c, "Con")) {
                // A connection needs both ends of the pair
                let (Some(from_id), Some(weight)) = (
                    doc.get_attribute(con, "from"),
                    doc.get_attribute(con, "weight"),
                ) else {
                    continue;
                };
                let Some(row) = from.resolve(parse_index(from_id)) else {
                    tracing::trace!(
                        model = self.model_name(),
                        layer,
                        from = from_id,
                        "connection from unknown neuron ignored"
                    );
                    continue;
                };
                if let Some(slot) = weights.get_mut((row, column)) {
                    *slot = parse_real(weight);
                }
            }
        }
        Ok(weights)
    }

    // =========================================================================
    // Normalization
    // =========================================================================

    /// One descriptor per input, read from the inputs' `LinearNorm` pairs
    pub fn inputs_normalization(&self) -> Result<Vec<NormDescriptor>> {
        let descriptors = self.normalization(
            "NeuralInputs/NeuralInput/DerivedField/NormContinuous/LinearNorm",
            self.number_of_inputs()?,
        )?;
        diagnose_shapes(&descriptors, NormalizationSide::Inputs);
        Ok(descriptors)
    }

    /// One descriptor per output, read from the outputs' `LinearNorm` pairs
    pub fn outputs_normalization(&self) -> Result<Vec<NormDescriptor>> {
        let descriptors = self.normalization(
            "NeuralOutputs/NeuralOutput/DerivedField/NormContinuous/LinearNorm",
            self.number_of_outputs()?,
        )?;
        diagnose_shapes(&descriptors, NormalizationSide::Outputs);
        Ok(descriptors)
    }

    /// Each variable contributes two `LinearNorm` points; the `orig` and
    /// `norm` columns are filled independently and only when exactly two
    /// values per variable are present.
    fn normalization(&self, pattern: &str, count: usize) -> Result<Vec<NormDescriptor>> {
        let doc = self.document();
        let mut descriptors = vec![NormDescriptor::default(); count];

        let orig = doc.select_values(self.node(), &format!("{}/@orig", pattern))?;
        if !orig.is_empty() && orig.len() == 2 * count {
            for (d, pair) in descriptors.iter_mut().zip(orig.chunks(2)) {
                d.orig0 = parse_real(&pair[0]);
                d.orig1 = parse_real(&pair[1]);
            }
        }
        let norm = doc.select_values(self.node(), &format!("{}/@norm", pattern))?;
        if !norm.is_empty() && norm.len() == 2 * count {
            for (d, pair) in descriptors.iter_mut().zip(norm.chunks(2)) {
                d.norm0 = parse_real(&pair[0]);
                d.norm1 = parse_real(&pair[1]);
            }
        }
        Ok(descriptors)
    }
}
