// ============================================================
// Layer 5 — Generator
// ============================================================
// Linear projection d_model → tgt_vocab followed by
// log-softmax over the vocabulary axis. The output is
// next-token log-probabilities; exp() of each row sums to 1.
//
// Burn's log_softmax subtracts the row max before
// exponentiating, so large logits don't overflow.

use burn::{
    nn::Linear,
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::domain::{shape::ensure_last_dim, Result};
use crate::ml::init::glorot_linear;

#[derive(Config, Debug)]
pub struct GeneratorConfig {
    pub d_model:    usize,
    pub vocab_size: usize,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        Generator {
            proj: glorot_linear(self.d_model, self.vocab_size, device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    pub proj: Linear<B>,
}

impl<B: Backend> Generator<B> {
    /// [batch, seq, d_model] → [batch, seq, vocab] log-probabilities
    pub fn forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let d_model = self.proj.weight.val().dims()[0];
        ensure_last_dim("generator", &x.dims(), d_model)?;
        Ok(log_softmax(self.proj.forward(x), 2))
    }
}
