// ============================================================
// Layer 5 — Encoder-Decoder Model + Factory
// ============================================================
//   src ids ─► src_embed ─► Encoder ─► memory ─┐
//                                              ▼
//   tgt ids ─► tgt_embed ─────────────► Decoder ─► Generator ─► log-probs
//
// The encoder and decoder only meet through `memory` and the
// masks passed in by the caller; neither keeps state between
// calls.
//
// TransformerConfig is the factory. It validates every
// hyperparameter before allocating, then builds each part
// from its own config so no parameter tensor is shared:
//   - encoder / decoder stacks (N layers each)
//   - two embedding pipelines (source, target)
//   - the generator
// Rank-2 parameters are Xavier-uniform; rank-1 parameters keep
// their layer defaults.
//
// Dropout follows Burn's convention: active only on an
// autodiff backend. For inference either build the model on a
// plain backend, call `AutodiffModule::valid()`, or set
// dropout to 0.0.
//
// Reference: Vaswani et al. (2017) §3, Table 3 (base model)
//            Burn Book §3 (Config and Module)

use burn::prelude::*;

use crate::domain::{shape::head_dim, Result, TransformerError};
use crate::ml::{
    decoder::{Decoder, DecoderConfig, DecoderLayerConfig},
    embedding::{EmbeddingPipeline, EmbeddingPipelineConfig},
    encoder::{Encoder, EncoderConfig, EncoderLayerConfig},
    generator::{Generator, GeneratorConfig},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TransformerConfig {
    pub src_vocab: usize,
    pub tgt_vocab: usize,
    /// Layers per stack (N)
    #[config(default = 6)]
    pub n_layers: usize,
    #[config(default = 512)]
    pub d_model: usize,
    #[config(default = 2048)]
    pub d_ff: usize,
    #[config(default = 8)]
    pub n_heads: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    /// Positions covered by the positional encoding buffer
    #[config(default = 5000)]
    pub max_len: usize,
    #[config(default = 1e-6)]
    pub layer_norm_eps: f64,
}

impl TransformerConfig {
    /// Reject hyperparameters that can never build a model.
    pub fn validate(&self) -> Result<()> {
        head_dim(self.d_model, self.n_heads)?;

        let positive = [
            ("src_vocab", self.src_vocab),
            ("tgt_vocab", self.tgt_vocab),
            ("n_layers", self.n_layers),
            ("d_ff", self.d_ff),
            ("max_len", self.max_len),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(TransformerError::InvalidConfig(format!("{name} must be positive")));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(TransformerError::InvalidConfig(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        if !(self.layer_norm_eps > 0.0) {
            return Err(TransformerError::InvalidConfig(format!(
                "layer_norm_eps must be positive, got {}",
                self.layer_norm_eps
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Transformer<B>> {
        self.validate()?;

        let encoder_layer = EncoderLayerConfig::new(self.d_model, self.n_heads, self.d_ff)
            .with_dropout(self.dropout)
            .with_layer_norm_eps(self.layer_norm_eps);
        let decoder_layer = DecoderLayerConfig::new(self.d_model, self.n_heads, self.d_ff)
            .with_dropout(self.dropout)
            .with_layer_norm_eps(self.layer_norm_eps);

        let model = Transformer {
            encoder:   EncoderConfig::new(encoder_layer, self.n_layers).init(device)?,
            decoder:   DecoderConfig::new(decoder_layer, self.n_layers).init(device)?,
            src_embed: self.embedding(self.src_vocab).init(device),
            tgt_embed: self.embedding(self.tgt_vocab).init(device),
            generator: GeneratorConfig::new(self.d_model, self.tgt_vocab).init(device),
        };

        tracing::debug!(
            "Transformer ready: N={}, d_model={}, heads={}, d_ff={}, {} parameters",
            self.n_layers, self.d_model, self.n_heads, self.d_ff, model.num_params()
        );
        Ok(model)
    }

    fn embedding(&self, vocab_size: usize) -> EmbeddingPipelineConfig {
        EmbeddingPipelineConfig::new(vocab_size, self.d_model)
            .with_dropout(self.dropout)
            .with_max_len(self.max_len)
    }
}

/// Build a model from the paper's hyperparameters.
#[allow(clippy::too_many_arguments)]
pub fn make_model<B: Backend>(
    src_vocab: usize,
    tgt_vocab: usize,
    n_layers:  usize,
    d_model:   usize,
    d_ff:      usize,
    n_heads:   usize,
    dropout:   f64,
    device:    &B::Device,
) -> Result<Transformer<B>> {
    TransformerConfig::new(src_vocab, tgt_vocab)
        .with_n_layers(n_layers)
        .with_d_model(d_model)
        .with_d_ff(d_ff)
        .with_n_heads(n_heads)
        .with_dropout(dropout)
        .init(device)
}

// ─── Transformer ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Transformer<B: Backend> {
    pub encoder:   Encoder<B>,
    pub decoder:   Decoder<B>,
    pub src_embed: EmbeddingPipeline<B>,
    pub tgt_embed: EmbeddingPipeline<B>,
    pub generator: Generator<B>,
}

impl<B: Backend> Transformer<B> {
    /// src: [batch, src_len], src_mask: [batch | 1, 1, src_len]
    /// → memory: [batch, src_len, d_model]
    pub fn encode(&self, src: Tensor<B, 2, Int>, src_mask: Tensor<B, 3, Bool>) -> Result<Tensor<B, 3>> {
        let embedded = self.src_embed.forward(src)?;
        self.encoder.forward(embedded, Some(src_mask))
    }

    /// tgt: [batch, tgt_len], tgt_mask: [batch | 1, tgt_len, tgt_len]
    /// → [batch, tgt_len, d_model]
    pub fn decode(
        &self,
        memory:   Tensor<B, 3>,
        src_mask: Tensor<B, 3, Bool>,
        tgt:      Tensor<B, 2, Int>,
        tgt_mask: Tensor<B, 3, Bool>,
    ) -> Result<Tensor<B, 3>> {
        let embedded = self.tgt_embed.forward(tgt)?;
        self.decoder.forward(embedded, memory, Some(src_mask), Some(tgt_mask))
    }

    /// Take in and process masked source and target sequences.
    pub fn forward(
        &self,
        src:      Tensor<B, 2, Int>,
        tgt:      Tensor<B, 2, Int>,
        src_mask: Tensor<B, 3, Bool>,
        tgt_mask: Tensor<B, 3, Bool>,
    ) -> Result<Tensor<B, 3>> {
        tracing::trace!("forward: src {:?}, tgt {:?}", src.dims(), tgt.dims());
        let memory = self.encode(src, src_mask.clone())?;
        self.decode(memory, src_mask, tgt, tgt_mask)
    }

    /// Decoder output → next-token log-probabilities [batch, tgt_len, tgt_vocab].
    pub fn generate(&self, decoder_output: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        self.generator.forward(decoder_output)
    }
}
