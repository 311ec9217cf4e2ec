// ============================================================
// Layer 5 — Decoder
// ============================================================
// DecoderLayer = three sublayer connections:
//   1. masked self-attention over the target
//        mask = causal AND target padding
//   2. cross-attention
//        Q = decoder state, K = V = encoder memory,
//        mask = source padding
//   3. feed-forward
//
// Decoder = N DecoderLayers + a final LayerNorm, built the same
// way as the encoder (one init call per layer).
//
// Shapes:
//   x:        [batch, tgt_len, d_model]
//   memory:   [batch, src_len, d_model]
//   src_mask: [batch | 1, 1, src_len]
//   tgt_mask: [batch | 1, tgt_len, tgt_len]
//
// Reference: Vaswani et al. (2017) §3.1, §3.2.3

use burn::prelude::*;

use crate::domain::{Result, TransformerError};
use crate::ml::{
    attention::{MultiHeadAttention, MultiHeadAttentionConfig},
    feed_forward::{FeedForward, FeedForwardConfig},
    norm::{LayerNorm, LayerNormConfig},
    sublayer::{SublayerConnection, SublayerConnectionConfig},
};

// ─── DecoderLayer ─────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct DecoderLayerConfig {
    pub d_model: usize,
    pub n_heads: usize,
    pub d_ff:    usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    #[config(default = 1e-6)]
    pub layer_norm_eps: f64,
}

impl DecoderLayerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<DecoderLayer<B>> {
        let attention = MultiHeadAttentionConfig::new(self.d_model, self.n_heads)
            .with_dropout(self.dropout);
        let sublayer = SublayerConnectionConfig::new(self.d_model)
            .with_dropout(self.dropout)
            .with_layer_norm_eps(self.layer_norm_eps);

        Ok(DecoderLayer {
            self_attn: attention.init(device)?,
            src_attn:  attention.init(device)?,
            feed_forward: FeedForwardConfig::new(self.d_model, self.d_ff)
                .with_dropout(self.dropout)
                .init(device),
            self_attn_sublayer: sublayer.init(device)?,
            src_attn_sublayer:  sublayer.init(device)?,
            ff_sublayer:        sublayer.init(device)?,
        })
    }
}

#[derive(Module, Debug)]
pub struct DecoderLayer<B: Backend> {
    pub self_attn:          MultiHeadAttention<B>,
    pub src_attn:           MultiHeadAttention<B>,
    pub feed_forward:       FeedForward<B>,
    pub self_attn_sublayer: SublayerConnection<B>,
    pub src_attn_sublayer:  SublayerConnection<B>,
    pub ff_sublayer:        SublayerConnection<B>,
}

impl<B: Backend> DecoderLayer<B> {
    pub fn forward(
        &self,
        x:        Tensor<B, 3>,
        memory:   Tensor<B, 3>,
        src_mask: Option<Tensor<B, 3, Bool>>,
        tgt_mask: Option<Tensor<B, 3, Bool>>,
    ) -> Result<Tensor<B, 3>> {
        let x = self.self_attn_sublayer.forward(x, |x| {
            Ok(self.self_attn.forward(x.clone(), x.clone(), x, tgt_mask)?.context)
        })?;
        let x = self.src_attn_sublayer.forward(x, |x| {
            Ok(self.src_attn.forward(x, memory.clone(), memory, src_mask)?.context)
        })?;
        self.ff_sublayer.forward(x, |x| self.feed_forward.forward(x))
    }
}

// ─── Decoder stack ────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct DecoderConfig {
    /// Template every layer is built from
    pub layer:    DecoderLayerConfig,
    pub n_layers: usize,
}

impl DecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Decoder<B>> {
        if self.n_layers == 0 {
            return Err(TransformerError::InvalidConfig(
                "a decoder needs at least one layer".into(),
            ));
        }

        let layers = (0..self.n_layers)
            .map(|_| self.layer.init(device))
            .collect::<Result<Vec<_>>>()?;
        let norm = LayerNormConfig::new(self.layer.d_model)
            .with_eps(self.layer.layer_norm_eps)
            .init(device)?;

        tracing::debug!(
            "Decoder ready: {} layers, d_model={}, heads={}",
            self.n_layers, self.layer.d_model, self.layer.n_heads
        );
        Ok(Decoder { layers, norm })
    }
}

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub layers: Vec<DecoderLayer<B>>,
    pub norm:   LayerNorm<B>,
}

impl<B: Backend> Decoder<B> {
    pub fn forward(
        &self,
        x:        Tensor<B, 3>,
        memory:   Tensor<B, 3>,
        src_mask: Option<Tensor<B, 3, Bool>>,
        tgt_mask: Option<Tensor<B, 3, Bool>>,
    ) -> Result<Tensor<B, 3>> {
        let mut x = x;
        for layer in &self.layers {
            x = layer.forward(x, memory.clone(), src_mask.clone(), tgt_mask.clone())?;
        }
        self.norm.forward(x)
    }
}
