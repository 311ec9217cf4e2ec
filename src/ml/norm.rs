// ============================================================
// Layer 5 — Layer Normalisation
// ============================================================
// Normalises each position over its feature (last) axis:
//
//   y = gamma * (x - mean) / (std + eps) + beta
//
// Two details differ from burn::nn::LayerNorm, which is why
// this module exists:
//   - std is the unbiased (n - 1) standard deviation
//   - eps is added to std, not to the variance under the root
//
// gamma starts at ones and beta at zeros, so a fresh layer is
// a pure normaliser.
//
// Reference: Ba et al. (2016) Layer Normalization

use burn::{
    module::Param,
    nn::Initializer,
    prelude::*,
};

use crate::domain::{shape::ensure_last_dim, Result, TransformerError};

#[derive(Config, Debug)]
pub struct LayerNormConfig {
    pub d_model: usize,
    #[config(default = 1e-6)]
    pub eps: f64,
}

impl LayerNormConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<LayerNorm<B>> {
        if self.d_model == 0 {
            return Err(TransformerError::InvalidConfig(
                "layer norm needs at least one feature".into(),
            ));
        }
        if !(self.eps > 0.0) {
            return Err(TransformerError::InvalidConfig(format!(
                "layer norm eps must be positive, got {}",
                self.eps
            )));
        }
        Ok(LayerNorm {
            gamma: Initializer::Ones.init([self.d_model], device),
            beta:  Initializer::Zeros.init([self.d_model], device),
            eps:   self.eps,
        })
    }
}

#[derive(Module, Debug)]
pub struct LayerNorm<B: Backend> {
    /// Per-feature scale, [d_model]
    pub gamma: Param<Tensor<B, 1>>,
    /// Per-feature shift, [d_model]
    pub beta:  Param<Tensor<B, 1>>,
    pub eps:   f64,
}

impl<B: Backend> LayerNorm<B> {
    pub fn d_model(&self) -> usize {
        self.gamma.val().dims()[0]
    }

    /// (x - mean) / (std + eps), before gamma and beta.
    pub fn normalize<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let features = x.dims()[D - 1];
        let mean = x.clone().mean_dim(D - 1);
        let centered = x - mean;
        let std = centered
            .clone()
            .powf_scalar(2.0)
            .sum_dim(D - 1)
            .div_scalar(features.saturating_sub(1).max(1) as f64)
            .sqrt();

        centered / std.add_scalar(self.eps)
    }

    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Result<Tensor<B, D>> {
        ensure_last_dim("layer_norm", &x.dims(), self.d_model())?;

        let gamma = self.gamma.val().unsqueeze::<D>();
        let beta = self.beta.val().unsqueeze::<D>();
        Ok(self.normalize(x) * gamma + beta)
    }
}
