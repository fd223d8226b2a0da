//! End-to-end network assembly

use super::layer::layer_stage;
use super::normalization::{input_stage, output_stage};
use crate::error::Result;
use crate::function::ComposedFunction;
use crate::network::NeuralNetworkRef;

/// Compose input normalization, every layer in order, and output
/// denormalization into one function from raw inputs to raw outputs
pub fn assemble(net: &NeuralNetworkRef<'_>) -> Result<ComposedFunction> {
    let inputs = net.inputs_normalization()?;
    let mut function = ComposedFunction::from_stage(input_stage(&inputs, net.input_names()?));

    let number_of_layers = net.number_of_layers()?;
    for layer in 0..number_of_layers {
        function = function.then(layer_stage(net, layer)?);
    }

    let outputs = net.outputs_normalization()?;
    let function = function.then(output_stage(&outputs));
    tracing::debug!(
        model = net.model_name(),
        layers = number_of_layers,
        inputs = inputs.len(),
        outputs = outputs.len(),
        stages = function.stages().len(),
        "neural network assembled"
    );
    Ok(function)
}
