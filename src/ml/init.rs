// ============================================================
// Layer 5 — Parameter Initialisation
// ============================================================
// Glorot / Xavier-uniform for every rank-2 parameter:
//
//   W ~ U(-a, a),  a = gain * sqrt(6 / (fan_in + fan_out))
//
// Rank-1 parameters (Linear biases, LayerNorm gamma/beta) keep
// whatever default their layer gives them. Burn's LinearConfig
// applies one initializer to both weight and bias, so the
// helpers below build the layer with its defaults and then
// swap in a fresh Xavier weight.
//
// Reference: Glorot & Bengio (2010)
//            Burn Book §3 (Module initialisation)

use burn::{
    module::Param,
    nn::{Embedding, EmbeddingConfig, Initializer, Linear, LinearConfig},
    prelude::*,
};

const GLOROT: Initializer = Initializer::XavierUniform { gain: 1.0 };

/// A Xavier-uniform rank-2 parameter of the given shape.
pub fn glorot_uniform<B: Backend>(shape: [usize; 2], device: &B::Device) -> Param<Tensor<B, 2>> {
    let [rows, cols] = shape;
    GLOROT.init_with(shape, Some(rows), Some(cols), device)
}

/// Linear layer with a Xavier weight and Burn's default bias.
/// Burn stores the weight as [d_input, d_output].
pub fn glorot_linear<B: Backend>(d_input: usize, d_output: usize, device: &B::Device) -> Linear<B> {
    let mut linear = LinearConfig::new(d_input, d_output).init(device);
    linear.weight = glorot_uniform([d_input, d_output], device);
    linear
}

/// Lookup table [n_embedding, d_model] with a Xavier weight.
pub fn glorot_embedding<B: Backend>(n_embedding: usize, d_model: usize, device: &B::Device) -> Embedding<B> {
    let mut embedding = EmbeddingConfig::new(n_embedding, d_model).init(device);
    embedding.weight = glorot_uniform([n_embedding, d_model], device);
    embedding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_utils::{device, TestBackend};

    #[test]
    fn test_glorot_bounds() {
        let (rows, cols) = (32, 64);
        let bound = (6.0f32 / (rows + cols) as f32).sqrt();

        let weight = glorot_uniform::<TestBackend>([rows, cols], &device());
        let values = weight.val().into_data().to_vec::<f32>().unwrap();

        assert_eq!(values.len(), rows * cols);
        assert!(values.iter().all(|v| v.abs() <= bound));
        // Not a constant fill
        assert!(values.iter().any(|v| (v - values[0]).abs() > 1e-6));
    }

    #[test]
    fn test_linear_keeps_bias_and_shapes() {
        let linear = glorot_linear::<TestBackend>(8, 24, &device());
        assert_eq!(linear.weight.val().dims(), [8, 24]);
        let bias = linear.bias.expect("linear layers are built with a bias");
        assert_eq!(bias.val().dims(), [24]);
    }
}
