//! Layer evaluation stages

use crate::error::Result;
use crate::function::{Activation, Expr, FunctionStage};
use crate::network::NeuralNetworkRef;
use ndarray::{Array1, Array2};

/// `activation(sum_k weights[k, i] * x_k + bias[i])` for every neuron `i`
///
/// Entries missing from `weights` or `bias` (a degraded layer) count as 0.
pub fn compile_layer(
    weights: &Array2<f64>,
    bias: &Array1<f64>,
    input_dimension: usize,
    size: usize,
    activation: Activation,
) -> FunctionStage {
    let outputs = (0..size)
        .map(|i| {
            let sum = (0..input_dimension)
                .map(|k| {
                    let w = weights.get((k, i)).copied().unwrap_or(0.0);
                    Expr::mul(Expr::constant(w), Expr::var(k))
                })
                .reduce(Expr::add);
            let b = Expr::constant(bias.get(i).copied().unwrap_or(0.0));
            let z = match sum {
                Some(sum) => Expr::add(sum, b),
                None => b,
            };
            activation.apply(z)
        })
        .collect();
    FunctionStage::positional(input_dimension, outputs)
}

/// Stage for one layer of `net`; a layer without neurons gives an empty stage
pub fn layer_stage(net: &NeuralNetworkRef<'_>, layer: usize) -> Result<FunctionStage> {
    let input_dimension = if layer == 0 {
        net.number_of_inputs()?
    } else {
        net.layer_size(layer - 1)?
    };
    let size = net.layer_size(layer)?;
    if size == 0 {
        return Ok(FunctionStage::positional(input_dimension, Vec::new()));
    }

    let activation = net.activation(layer)?;
    let bias = net.bias(layer)?;
    let weights = net.weights(layer)?;
    tracing::trace!(
        model = net.model_name(),
        layer,
        size,
        %activation,
        "layer compiled"
    );
    Ok(compile_layer(&weights, &bias, input_dimension, size, activation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_weighted_sum_plus_bias() {
        let weights = array![[1.0, -2.0], [0.5, 3.0]];
        let bias = array![0.25, -1.0];
        let stage = compile_layer(&weights, &bias, 2, 2, Activation::Identity);
        // x = [2, 4]: [1*2 + 0.5*4 + 0.25, -2*2 + 3*4 - 1]
        assert_eq!(stage.evaluate(&[2.0, 4.0]), vec![4.25, 7.0]);
        assert_eq!(stage.formulas()[0], "1.0 * x0 + 0.5 * x1 + 0.25");
    }

    #[test]
    fn test_activation_wraps_sum() {
        let weights = array![[2.0]];
        let bias = array![0.0];
        let stage = compile_layer(&weights, &bias, 1, 1, Activation::Tanh);
        assert_eq!(stage.evaluate(&[0.3])[0], (0.6f64).tanh());
    }

    #[test]
    fn test_degraded_layer_reads_zero_weights() {
        let weights = Array2::zeros((0, 0));
        let bias = array![1.5, 2.5];
        let stage = compile_layer(&weights, &bias, 3, 2, Activation::Identity);
        assert_eq!(stage.input_dimension(), 3);
        assert_eq!(stage.evaluate(&[9.0, 9.0, 9.0]), vec![1.5, 2.5]);
    }

    #[test]
    fn test_layer_without_inputs_is_constant() {
        let stage = compile_layer(&Array2::zeros((0, 1)), &array![0.5], 0, 1, Activation::Exponential);
        assert_eq!(stage.evaluate(&[]), vec![0.5f64.exp()]);
    }
}
