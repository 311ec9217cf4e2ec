// ============================================================
// Layer 3 — Error Kinds
// ============================================================
// Every contract violation in the model is reported through
// one enum so callers can match on what went wrong:
//
//   HeadsDoNotDivideModel / InvalidConfig
//       → the hyperparameters can never produce a valid model;
//         raised by the factory before any forward call
//
//   ShapeMismatch / SequenceTooLong / TokenOutOfRange
//       → a tensor handed to an operation does not fit its
//         contract; raised at the call site
//
// Nothing here is retried. The forward pass is deterministic,
// so calling again with the same inputs fails the same way.
//
// Reference: thiserror documentation
//            Rust Book §9 (Recoverable Errors with Result)

use thiserror::Error;

/// Result alias used throughout the model code. The error parameter
/// stays open so derive macros that name `Result<T, E>` still resolve.
pub type Result<T, E = TransformerError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformerError {
    /// d_model must split evenly into attention heads.
    #[error("d_model ({d_model}) is not divisible by the head count ({n_heads})")]
    HeadsDoNotDivideModel { d_model: usize, n_heads: usize },

    /// Any other hyperparameter that cannot build a model.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A tensor's rank or dimensions don't fit the operation.
    #[error("shape mismatch in {op}: expected {expected}, got {actual:?}")]
    ShapeMismatch {
        op:       &'static str,
        expected: String,
        actual:   Vec<usize>,
    },

    /// The positional encoding buffer is shorter than the input.
    #[error("sequence length {len} exceeds the positional encoding capacity {max_len}")]
    SequenceTooLong { len: usize, max_len: usize },

    /// A token id falls outside its embedding table.
    #[error("token id out of range: ids must lie in [0, {vocab_size}), found {min}..={max}")]
    TokenOutOfRange { vocab_size: usize, min: i64, max: i64 },
}

impl TransformerError {
    pub(crate) fn shape(op: &'static str, expected: impl Into<String>, actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            op,
            expected: expected.into(),
            actual:   actual.to_vec(),
        }
    }
}
