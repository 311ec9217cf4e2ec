// ============================================================
// Layer 5 — Encoder
// ============================================================
// EncoderLayer = two sublayer connections:
//   1. self-attention   (Q = K = V = x, source padding mask)
//   2. feed-forward
//
// Encoder = N EncoderLayers applied in order + a final
// LayerNorm over the stack output.
//
// The N layers share a topology but NOT parameters: the stack
// calls EncoderLayerConfig::init once per layer, so each layer
// allocates its own weights.
//
// Shapes:
//   x:    [batch, src_len, d_model]  →  same shape out
//   mask: [batch | 1, 1 | src_len, src_len]
//
// Reference: Vaswani et al. (2017) §3.1

use burn::prelude::*;

use crate::domain::{Result, TransformerError};
use crate::ml::{
    attention::{MultiHeadAttention, MultiHeadAttentionConfig},
    feed_forward::{FeedForward, FeedForwardConfig},
    norm::{LayerNorm, LayerNormConfig},
    sublayer::{SublayerConnection, SublayerConnectionConfig},
};

// ─── EncoderLayer ─────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct EncoderLayerConfig {
    pub d_model: usize,
    pub n_heads: usize,
    pub d_ff:    usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    #[config(default = 1e-6)]
    pub layer_norm_eps: f64,
}

impl EncoderLayerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<EncoderLayer<B>> {
        let sublayer = SublayerConnectionConfig::new(self.d_model)
            .with_dropout(self.dropout)
            .with_layer_norm_eps(self.layer_norm_eps);

        Ok(EncoderLayer {
            self_attn: MultiHeadAttentionConfig::new(self.d_model, self.n_heads)
                .with_dropout(self.dropout)
                .init(device)?,
            feed_forward: FeedForwardConfig::new(self.d_model, self.d_ff)
                .with_dropout(self.dropout)
                .init(device),
            attn_sublayer: sublayer.init(device)?,
            ff_sublayer:   sublayer.init(device)?,
        })
    }
}

#[derive(Module, Debug)]
pub struct EncoderLayer<B: Backend> {
    pub self_attn:     MultiHeadAttention<B>,
    pub feed_forward:  FeedForward<B>,
    pub attn_sublayer: SublayerConnection<B>,
    pub ff_sublayer:   SublayerConnection<B>,
}

impl<B: Backend> EncoderLayer<B> {
    pub fn forward(&self, x: Tensor<B, 3>, mask: Option<Tensor<B, 3, Bool>>) -> Result<Tensor<B, 3>> {
        let x = self.attn_sublayer.forward(x, |x| {
            Ok(self.self_attn.forward(x.clone(), x.clone(), x, mask)?.context)
        })?;
        self.ff_sublayer.forward(x, |x| self.feed_forward.forward(x))
    }
}

// ─── Encoder stack ────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct EncoderConfig {
    /// Template every layer is built from
    pub layer:    EncoderLayerConfig,
    pub n_layers: usize,
}

impl EncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Encoder<B>> {
        if self.n_layers == 0 {
            return Err(TransformerError::InvalidConfig(
                "an encoder needs at least one layer".into(),
            ));
        }

        let layers = (0..self.n_layers)
            .map(|_| self.layer.init(device))
            .collect::<Result<Vec<_>>>()?;
        let norm = LayerNormConfig::new(self.layer.d_model)
            .with_eps(self.layer.layer_norm_eps)
            .init(device)?;

        tracing::debug!(
            "Encoder ready: {} layers, d_model={}, heads={}",
            self.n_layers, self.layer.d_model, self.layer.n_heads
        );
        Ok(Encoder { layers, norm })
    }
}

#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub layers: Vec<EncoderLayer<B>>,
    pub norm:   LayerNorm<B>,
}

impl<B: Backend> Encoder<B> {
    /// Pass the input (and mask) through each layer in turn.
    pub fn forward(&self, x: Tensor<B, 3>, mask: Option<Tensor<B, 3, Bool>>) -> Result<Tensor<B, 3>> {
        let mut x = x;
        for layer in &self.layers {
            x = layer.forward(x, mask.clone())?;
        }
        self.norm.forward(x)
    }
}
