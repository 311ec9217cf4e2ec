// ============================================================
// Layer 3 — Shape Contracts
// ============================================================
// Plain functions over dimension slices. The ML layer calls
// these before handing tensors to Burn so that a bad shape
// becomes a TransformerError instead of a backend panic.
//
// Broadcasting rule (same as NumPy / Burn):
//   two dims are compatible when they are equal or when the
//   mask side is 1. Ranks must match exactly — we never
//   silently add leading dims.
//
// Reference: NumPy broadcasting semantics
//            Rust Book §8 (Slices)

use crate::domain::error::{Result, TransformerError};

/// Check that `d_model` splits evenly into `n_heads` heads and
/// return the per-head width d_k.
pub fn head_dim(d_model: usize, n_heads: usize) -> Result<usize> {
    if n_heads == 0 || d_model == 0 {
        return Err(TransformerError::InvalidConfig(format!(
            "d_model ({d_model}) and head count ({n_heads}) must both be positive"
        )));
    }
    if d_model % n_heads != 0 {
        return Err(TransformerError::HeadsDoNotDivideModel { d_model, n_heads });
    }
    Ok(d_model / n_heads)
}

/// Check that a mask of shape `mask` can be broadcast onto `target`.
pub fn ensure_broadcastable(op: &'static str, mask: &[usize], target: &[usize]) -> Result<()> {
    let compatible = mask.len() == target.len()
        && mask
            .iter()
            .zip(target)
            .all(|(&m, &t)| m == t || m == 1);

    if compatible {
        Ok(())
    } else {
        Err(TransformerError::shape(
            op,
            format!("a mask broadcastable to {target:?}"),
            mask,
        ))
    }
}

/// Check that the trailing (feature) dim equals `expected`.
pub fn ensure_last_dim(op: &'static str, dims: &[usize], expected: usize) -> Result<()> {
    match dims.last() {
        Some(&last) if last == expected => Ok(()),
        _ => Err(TransformerError::shape(op, format!("[.., {expected}]"), dims)),
    }
}

/// Check that two shapes are identical.
pub fn ensure_same(op: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformerError::shape(op, format!("{expected:?}"), actual))
    }
}
