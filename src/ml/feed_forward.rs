// ============================================================
// Layer 5 — Position-wise Feed-Forward
// ============================================================
//   FFN(x) = W2 · dropout(relu(W1 · x + b1)) + b2
//
// d_model → d_ff → d_model, applied to every position on its
// own. Nothing here mixes information across the sequence;
// that is attention's job.

use burn::{
    nn::{Dropout, DropoutConfig, Linear},
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::{shape::ensure_last_dim, Result};
use crate::ml::init::glorot_linear;

#[derive(Config, Debug)]
pub struct FeedForwardConfig {
    pub d_model: usize,
    pub d_ff:    usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl FeedForwardConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FeedForward<B> {
        FeedForward {
            w_1:     glorot_linear(self.d_model, self.d_ff, device),
            w_2:     glorot_linear(self.d_ff, self.d_model, device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct FeedForward<B: Backend> {
    pub w_1:     Linear<B>,
    pub w_2:     Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> FeedForward<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let d_model = self.w_1.weight.val().dims()[0];
        ensure_last_dim("feed_forward", &x.dims(), d_model)?;

        let hidden = self.dropout.forward(relu(self.w_1.forward(x)));
        Ok(self.w_2.forward(hidden))
    }
}
