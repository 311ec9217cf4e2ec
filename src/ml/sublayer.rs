// ============================================================
// Layer 5 — Sublayer Connection
// ============================================================
// Residual + normalisation wrapper around any shape-preserving
// sublayer (self-attention, cross-attention, feed-forward):
//
//   out = x + norm(dropout(sublayer(x)))
//
// This is NOT the paper's post-norm  norm(x + dropout(f(x)))
// and NOT the common pre-norm        x + dropout(f(norm(x))).
// The normalisation sits on the branch after dropout, and the
// residual path carries x through untouched.
//
// The sublayer is passed in as a closure so the same wrapper
// serves attention (which needs masks and memory captured from
// the caller) and the feed-forward block.

use burn::{
    nn::{Dropout, DropoutConfig},
    prelude::*,
};

use crate::domain::{shape::ensure_same, Result};
use crate::ml::norm::{LayerNorm, LayerNormConfig};

#[derive(Config, Debug)]
pub struct SublayerConnectionConfig {
    pub d_model: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    #[config(default = 1e-6)]
    pub layer_norm_eps: f64,
}

impl SublayerConnectionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SublayerConnection<B>> {
        Ok(SublayerConnection {
            norm: LayerNormConfig::new(self.d_model)
                .with_eps(self.layer_norm_eps)
                .init(device)?,
            dropout: DropoutConfig::new(self.dropout).init(),
        })
    }
}

#[derive(Module, Debug)]
pub struct SublayerConnection<B: Backend> {
    pub norm:    LayerNorm<B>,
    pub dropout: Dropout,
}

impl<B: Backend> SublayerConnection<B> {
    pub fn forward<F>(&self, x: Tensor<B, 3>, sublayer: F) -> Result<Tensor<B, 3>>
    where
        F: FnOnce(Tensor<B, 3>) -> Result<Tensor<B, 3>>,
    {
        let dims = x.dims();
        let branch = sublayer(x.clone())?;
        ensure_same("sublayer_connection", &dims, &branch.dims())?;

        Ok(x + self.norm.forward(self.dropout.forward(branch))?)
    }
}
