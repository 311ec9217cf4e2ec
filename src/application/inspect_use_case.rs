// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Builds a model and pushes one seeded random batch through
// every public operation, in order:
//
//   Step 1: Validate + build the model      (Layer 5 - ml)
//   Step 2: Draw random token ids           (rand, seeded)
//   Step 3: Build padding / causal masks    (Layer 5 - ml)
//   Step 4: encode → memory
//   Step 5: decode → decoder output
//   Step 6: generate → log-probabilities
//   Step 7: Summarise into a ForwardReport
//
// The report is plain serde data so the CLI can print it as
// text or JSON without touching Burn types.
//
// Reference: Burn Book §3 (Inference)
//            rand crate documentation (StdRng)

use anyhow::{Context, Result};
use burn::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ml::{
    mask::{padding_mask, target_mask},
    model::TransformerConfig,
};

#[cfg(feature = "wgpu")]
pub type InspectBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type InspectBackend = burn::backend::NdArray;

// ─── Run Configuration ────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    pub batch_size: usize,
    pub src_len:    usize,
    pub tgt_len:    usize,
    /// Seeds both the token draw and the backend RNG
    pub seed:       u64,
    /// Token id treated as padding when building masks
    pub pad_id:     i64,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            batch_size: 2,
            src_len:    10,
            tgt_len:    8,
            seed:       42,
            pad_id:     0,
        }
    }
}

// ─── Report ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardReport {
    pub model:          TransformerConfig,
    pub num_params:     usize,
    pub src_shape:      Vec<usize>,
    pub tgt_shape:      Vec<usize>,
    pub memory_shape:   Vec<usize>,
    pub output_shape:   Vec<usize>,
    pub log_prob_shape: Vec<usize>,
    pub positions:      Vec<PositionReport>,
}

/// Most likely next token at one target position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionReport {
    pub batch:        usize,
    pub position:     usize,
    pub argmax_token: usize,
    pub log_prob:     f32,
    /// Sum of exp(log_prob) over the vocabulary, should be ~1
    pub total_mass:   f32,
}

// ─── InspectUseCase ───────────────────────────────────────────────────────────
pub struct InspectUseCase {
    model_config: TransformerConfig,
    run:          InspectConfig,
}

impl InspectUseCase {
    pub fn new(model_config: TransformerConfig, run: InspectConfig) -> Self {
        Self { model_config, run }
    }

    pub fn execute(&self) -> Result<ForwardReport> {
        let device = Default::default();
        self.execute_on::<InspectBackend>(&device)
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<ForwardReport> {
        let cfg = &self.model_config;
        let run = &self.run;
        if run.batch_size == 0 || run.src_len == 0 || run.tgt_len == 0 {
            anyhow::bail!("batch size and sequence lengths must be positive");
        }

        // ── Step 1: Build the model ──────────────────────────────────────────
        B::seed(device, run.seed);
        let model = cfg
            .init::<B>(device)
            .context("Failed to build the transformer")?;
        let num_params = model.num_params();
        tracing::info!(
            "Model ready: N={}, d_model={}, heads={}, {} parameters",
            cfg.n_layers, cfg.d_model, cfg.n_heads, num_params
        );

        // ── Step 2: Random token ids ─────────────────────────────────────────
        // Ids start at 1 so no position is padding
        let mut rng = StdRng::seed_from_u64(run.seed);
        let src = random_ids::<B>(&mut rng, run.batch_size, run.src_len, cfg.src_vocab, device);
        let tgt = random_ids::<B>(&mut rng, run.batch_size, run.tgt_len, cfg.tgt_vocab, device);

        // ── Step 3: Masks ────────────────────────────────────────────────────
        let src_mask = padding_mask(src.clone(), run.pad_id);
        let tgt_mask = target_mask(tgt.clone(), run.pad_id);

        // ── Steps 4-6: encode → decode → generate ────────────────────────────
        let memory = model
            .encode(src.clone(), src_mask.clone())
            .context("encode failed")?;
        let memory_shape = memory.dims().to_vec();
        let output = model
            .decode(memory, src_mask, tgt.clone(), tgt_mask)
            .context("decode failed")?;
        let output_shape = output.dims().to_vec();
        let log_probs = model.generate(output).context("generate failed")?;
        let log_prob_shape = log_probs.dims().to_vec();
        tracing::debug!("Log-probabilities: {:?}", log_prob_shape);

        // ── Step 7: Summarise ────────────────────────────────────────────────
        let positions = summarise_positions(log_probs)?;

        Ok(ForwardReport {
            model: cfg.clone(),
            num_params,
            src_shape: src.dims().to_vec(),
            tgt_shape: tgt.dims().to_vec(),
            memory_shape,
            output_shape,
            log_prob_shape,
            positions,
        })
    }
}

fn random_ids<B: Backend>(
    rng:    &mut StdRng,
    batch:  usize,
    len:    usize,
    vocab:  usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let ids: Vec<i64> = (0..batch * len)
        .map(|_| if vocab > 1 { rng.gen_range(1..vocab as i64) } else { 0 })
        .collect();
    Tensor::<B, 1, Int>::from_ints(ids.as_slice(), device).reshape([batch, len])
}

fn summarise_positions<B: Backend>(log_probs: Tensor<B, 3>) -> Result<Vec<PositionReport>> {
    let [batch, len, vocab] = log_probs.dims();
    let values = log_probs
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read log-probabilities: {e:?}"))?;

    let reports = values
        .chunks(vocab)
        .enumerate()
        .map(|(row, scores)| {
            let (argmax_token, log_prob) = scores
                .iter()
                .copied()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });
            PositionReport {
                batch: row / len,
                position: row % len,
                argmax_token,
                log_prob,
                total_mass: scores.iter().map(|v| v.exp()).sum(),
            }
        })
        .collect::<Vec<_>>();

    debug_assert_eq!(reports.len(), batch * len);
    Ok(reports)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn tiny_model() -> TransformerConfig {
        TransformerConfig::new(20, 30)
            .with_n_layers(1)
            .with_d_model(8)
            .with_d_ff(16)
            .with_n_heads(2)
            .with_max_len(32)
    }

    #[test]
    fn test_report_covers_every_position() {
        let run = InspectConfig { batch_size: 2, src_len: 5, tgt_len: 3, ..Default::default() };
        let report = InspectUseCase::new(tiny_model(), run)
            .execute_on::<NdArray>(&Default::default())
            .unwrap();

        assert_eq!(report.src_shape, vec![2, 5]);
        assert_eq!(report.memory_shape, vec![2, 5, 8]);
        assert_eq!(report.output_shape, vec![2, 3, 8]);
        assert_eq!(report.log_prob_shape, vec![2, 3, 30]);
        assert_eq!(report.positions.len(), 6);
        for p in &report.positions {
            assert!(p.argmax_token < 30);
            assert!((p.total_mass - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bad_heads_surface_as_error() {
        let model = tiny_model().with_n_heads(3);
        let result = InspectUseCase::new(model, InspectConfig::default())
            .execute_on::<NdArray>(&Default::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_report_serialises_to_json() {
        let run = InspectConfig { batch_size: 1, src_len: 2, tgt_len: 2, ..Default::default() };
        let report = InspectUseCase::new(tiny_model(), run)
            .execute_on::<NdArray>(&Default::default())
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["model"]["d_model"], 8);
        assert_eq!(json["positions"].as_array().unwrap().len(), 2);
    }
}
