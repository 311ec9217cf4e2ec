// ============================================================
// Layer 5 — Embeddings + Positional Encoding
// ============================================================
// Turns token ids into the d_model vectors the stacks consume:
//
//   ids ──► Embeddings ──► × √d_model ──► + PE[0..seq] ──► dropout
//
// Embeddings
//   A learned lookup table, one per vocabulary. The √d_model
//   scale keeps the table's magnitude comparable to the
//   positional signal added on top of it.
//
// PositionalEncoding
//   A fixed table, never trained:
//     PE(p, 2k)   = sin(p / 10000^(2k / d_model))
//     PE(p, 2k+1) = cos(p / 10000^(2k / d_model))
//   Computed once for positions 0..max_len when the module is
//   built and stored as a constant tensor field. Every forward
//   call only reads it.
//
// Reference: Vaswani et al. (2017) §3.4, §3.5

use burn::{
    nn::{Dropout, DropoutConfig, Embedding},
    prelude::*,
    tensor::{ElementConversion, TensorData},
};

use crate::domain::{shape::ensure_last_dim, Result, TransformerError};
use crate::ml::init::glorot_embedding;

// ─── Embeddings ───────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct EmbeddingsConfig {
    pub vocab_size: usize,
    pub d_model:    usize,
}

impl EmbeddingsConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Embeddings<B> {
        Embeddings {
            lut:     glorot_embedding(self.vocab_size, self.d_model, device),
            d_model: self.d_model,
        }
    }
}

#[derive(Module, Debug)]
pub struct Embeddings<B: Backend> {
    pub lut:     Embedding<B>,
    pub d_model: usize,
}

impl<B: Backend> Embeddings<B> {
    pub fn vocab_size(&self) -> usize {
        self.lut.weight.dims()[0]
    }

    /// [batch, seq] ids → [batch, seq, d_model]
    ///
    /// Ids outside [0, vocab_size) are rejected before the lookup;
    /// backends differ on what an out-of-table gather does.
    pub fn forward(&self, ids: Tensor<B, 2, Int>) -> Result<Tensor<B, 3>> {
        self.check_range(&ids)?;
        Ok(self.lut.forward(ids).mul_scalar((self.d_model as f64).sqrt()))
    }

    fn check_range(&self, ids: &Tensor<B, 2, Int>) -> Result<()> {
        if ids.shape().num_elements() == 0 {
            return Ok(());
        }
        let vocab_size = self.vocab_size();
        let min: i64 = ids.clone().min().into_scalar().elem();
        let max: i64 = ids.clone().max().into_scalar().elem();

        if min < 0 || max >= vocab_size as i64 {
            return Err(TransformerError::TokenOutOfRange { vocab_size, min, max });
        }
        Ok(())
    }
}

// ─── PositionalEncoding ───────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct PositionalEncodingConfig {
    pub d_model: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    #[config(default = 5000)]
    pub max_len: usize,
}

impl PositionalEncodingConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PositionalEncoding<B> {
        let table = sinusoid_table(self.max_len, self.d_model);
        let pe = Tensor::from_data(TensorData::new(table, [self.max_len, self.d_model]), device);

        tracing::debug!("Positional encoding buffer: {} x {}", self.max_len, self.d_model);
        PositionalEncoding {
            pe,
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Row-major [max_len, d_model] sinusoid table.
///
/// The frequency is computed as exp(-2k · ln(10000) / d_model)
/// instead of 1 / 10000^(2k / d_model); the two are equal, and
/// the exp form never builds the huge intermediate power.
pub fn sinusoid_table(max_len: usize, d_model: usize) -> Vec<f32> {
    let log_base = 10000.0f64.ln();
    let mut table = Vec::with_capacity(max_len * d_model);

    for position in 0..max_len {
        for i in 0..d_model {
            let pair = (i / 2) * 2;
            let frequency = (-(pair as f64) * log_base / d_model as f64).exp();
            let angle = position as f64 * frequency;
            let value = if i % 2 == 0 { angle.sin() } else { angle.cos() };
            table.push(value as f32);
        }
    }
    table
}

#[derive(Module, Debug)]
pub struct PositionalEncoding<B: Backend> {
    /// [max_len, d_model], constant
    pub pe:      Tensor<B, 2>,
    pub dropout: Dropout,
}

impl<B: Backend> PositionalEncoding<B> {
    pub fn max_len(&self) -> usize {
        self.pe.dims()[0]
    }

    pub fn forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let [max_len, d_model] = self.pe.dims();
        let [batch, seq_len, _] = x.dims();
        ensure_last_dim("positional_encoding", &x.dims(), d_model)?;
        if seq_len > max_len {
            return Err(TransformerError::SequenceTooLong { len: seq_len, max_len });
        }

        let pe = self
            .pe
            .clone()
            .slice([0..seq_len, 0..d_model])
            .unsqueeze::<3>()
            .expand([batch, seq_len, d_model]);

        Ok(self.dropout.forward(x + pe))
    }
}

// ─── EmbeddingPipeline ────────────────────────────────────────────────────────
// One per vocabulary: the source and target pipelines share the
// positional algorithm but each owns its table and buffer.
#[derive(Config, Debug)]
pub struct EmbeddingPipelineConfig {
    pub vocab_size: usize,
    pub d_model:    usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    #[config(default = 5000)]
    pub max_len: usize,
}

impl EmbeddingPipelineConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EmbeddingPipeline<B> {
        EmbeddingPipeline {
            tokens: EmbeddingsConfig::new(self.vocab_size, self.d_model).init(device),
            position: PositionalEncodingConfig::new(self.d_model)
                .with_dropout(self.dropout)
                .with_max_len(self.max_len)
                .init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct EmbeddingPipeline<B: Backend> {
    pub tokens:   Embeddings<B>,
    pub position: PositionalEncoding<B>,
}

impl<B: Backend> EmbeddingPipeline<B> {
    pub fn forward(&self, ids: Tensor<B, 2, Int>) -> Result<Tensor<B, 3>> {
        self.position.forward(self.tokens.forward(ids)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_utils::{assert_close, device, int_tensor, to_vec, TestBackend};

    #[test]
    fn test_embedding_scale_is_sqrt_d_model() {
        let d_model = 16;
        let embeddings = EmbeddingsConfig::new(10, d_model).init::<TestBackend>(&device());
        let ids = int_tensor([1, 3], vec![4, 0, 9]);

        let scaled = to_vec(embeddings.forward(ids.clone()).unwrap());
        let raw = to_vec(embeddings.lut.forward(ids));

        let expected: Vec<f32> = raw.iter().map(|v| v * 4.0).collect();
        assert_close(&scaled, &expected, 1e-5);
    }

    #[test]
    fn test_ids_outside_the_table_are_rejected() {
        let embeddings = EmbeddingsConfig::new(11, 4).init::<TestBackend>(&device());

        assert_eq!(
            embeddings.forward(int_tensor([1, 2], vec![1, 11])).unwrap_err(),
            TransformerError::TokenOutOfRange { vocab_size: 11, min: 1, max: 11 }
        );
        assert_eq!(
            embeddings.forward(int_tensor([1, 2], vec![-1, 3])).unwrap_err(),
            TransformerError::TokenOutOfRange { vocab_size: 11, min: -1, max: 3 }
        );

        // Both ends of the table are valid
        assert_eq!(embeddings.forward(int_tensor([1, 2], vec![0, 10])).unwrap().dims(), [1, 2, 4]);
    }

    #[test]
    fn test_sinusoid_values() {
        let table = sinusoid_table(3, 4);

        // Position 0: sin(0) = 0 on even features, cos(0) = 1 on odd
        assert_close(&table[0..4], &[0.0, 1.0, 0.0, 1.0], 1e-7);

        // Position 1: feature pair k=1 uses frequency 10000^(-2/4) = 0.01
        let expected = [1.0f32.sin(), 1.0f32.cos(), 0.01f32.sin(), 0.01f32.cos()];
        assert_close(&table[4..8], &expected, 1e-6);
    }

    #[test]
    fn test_positional_encoding_is_added() {
        let pe = PositionalEncodingConfig::new(4)
            .with_max_len(8)
            .init::<TestBackend>(&device());
        let x = Tensor::<TestBackend, 3>::zeros([2, 3, 4], &device());

        let out = to_vec(pe.forward(x).unwrap());
        let table = sinusoid_table(3, 4);

        // Same buffer rows for every batch entry
        assert_close(&out[..12], &table, 1e-6);
        assert_close(&out[12..], &table, 1e-6);
    }

    #[test]
    fn test_too_long_sequence_is_rejected() {
        let pe = PositionalEncodingConfig::new(4)
            .with_max_len(2)
            .init::<TestBackend>(&device());
        let x = Tensor::<TestBackend, 3>::zeros([1, 3, 4], &device());

        assert_eq!(
            pe.forward(x).unwrap_err(),
            TransformerError::SequenceTooLong { len: 3, max_len: 2 }
        );
    }

    #[test]
    fn test_pipelines_do_not_share_tables() {
        let config = EmbeddingPipelineConfig::new(12, 8).with_max_len(16);
        let src = config.init::<TestBackend>(&device());
        let tgt = config.init::<TestBackend>(&device());

        assert_ne!(src.tokens.lut.weight.id, tgt.tokens.lut.weight.id);
        assert_eq!(src.forward(int_tensor([1, 2], vec![1, 2])).unwrap().dims(), [1, 2, 8]);
    }
}
