// Shared helpers for the ML layer's unit tests.

use burn::{
    backend::NdArray,
    prelude::*,
    tensor::TensorData,
};

/// CPU backend without autodiff: dropout is inactive here.
pub type TestBackend = NdArray<f32>;

pub fn device() -> <TestBackend as Backend>::Device {
    Default::default()
}

pub fn to_vec<const D: usize>(tensor: Tensor<TestBackend, D>) -> Vec<f32> {
    tensor.into_data().to_vec::<f32>().unwrap()
}

pub fn bool_tensor<const D: usize>(shape: [usize; D], values: Vec<bool>) -> Tensor<TestBackend, D, Bool> {
    Tensor::from_data(TensorData::new(values, shape), &device())
}

pub fn int_tensor<const D: usize>(shape: [usize; D], values: Vec<i64>) -> Tensor<TestBackend, D, Int> {
    Tensor::from_data(TensorData::new(values, shape), &device())
}

pub fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tol, "index {i}: {a} vs {e} (tol {tol})");
    }
}
