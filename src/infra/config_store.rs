// ============================================================
// Layer 6 — Config Store
// ============================================================
// Saves and restores TransformerConfig as pretty JSON so a
// model architecture can be rebuilt exactly from a file:
//
//   configs/
//     base.json   ← {"src_vocab": 32000, "n_layers": 6, ...}
//
// Only hyperparameters live here. Parameter values are the
// caller's to persist.
//
// Loading validates the config straight away, so a file with
// d_model = 10 and n_heads = 3 fails here instead of at the
// first forward call.
//
// Reference: Rust Book §9 (Error Handling)
//            serde_json documentation

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::ml::model::TransformerConfig;

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, cfg: &TransformerConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write config to '{}'", self.path.display()))?;

        tracing::debug!("Saved model config to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<TransformerConfig> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read config from '{}'", self.path.display()))?;

        let cfg: TransformerConfig = serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid model config", self.path.display()))?;
        cfg.validate()
            .with_context(|| format!("'{}' describes an impossible model", self.path.display()))?;

        tracing::debug!("Loaded model config from '{}'", self.path.display());
        Ok(cfg)
    }
}
