//! Forward computation of an encoder-decoder Transformer on Burn.
//!
//! ```no_run
//! use burn::backend::NdArray;
//! use burn::prelude::*;
//! use seq2seq_transformer::{padding_mask, target_mask, TransformerConfig};
//!
//! let device = Default::default();
//! let model = TransformerConfig::new(1000, 1000)
//!     .with_n_layers(2)
//!     .init::<NdArray>(&device)
//!     .unwrap();
//!
//! let src = Tensor::<NdArray, 2, Int>::from_ints([[5, 8, 13, 0]], &device);
//! let tgt = Tensor::<NdArray, 2, Int>::from_ints([[1, 42]], &device);
//! let out = model
//!     .forward(src.clone(), tgt.clone(), padding_mask(src, 0), target_mask(tgt, 0))
//!     .unwrap();
//! let log_probs = model.generate(out).unwrap(); // [1, 2, 1000]
//! ```

#![recursion_limit = "256"]

pub mod application;
pub mod domain;
pub mod infra;
pub mod ml;

pub use domain::{Result, TransformerError};
pub use ml::{
    attention::{scaled_dot_product_attention, AttentionOutput, MultiHeadAttention, MultiHeadAttentionConfig},
    mask::{padding_mask, subsequent_mask, subsequent_mask_rows, target_mask},
    model::{make_model, Transformer, TransformerConfig},
};
