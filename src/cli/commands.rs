// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `inspect` and `mask`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use seq2seq_transformer::{
    application::inspect_use_case::InspectConfig,
    TransformerConfig,
};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a model and run one forward pass on random tokens
    Inspect(InspectArgs),

    /// Print the causal (subsequent) mask for a sequence length
    Mask(MaskArgs),
}

/// All arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Load hyperparameters from this JSON file instead of the flags below
    #[arg(long)]
    pub config: Option<String>,

    /// Write the effective hyperparameters to this JSON file
    #[arg(long)]
    pub save_config: Option<String>,

    /// Source vocabulary size
    #[arg(long, default_value_t = 1000)]
    pub src_vocab: usize,

    /// Target vocabulary size
    #[arg(long, default_value_t = 1000)]
    pub tgt_vocab: usize,

    /// Layers per encoder / decoder stack (N)
    #[arg(long, default_value_t = 2)]
    pub n_layers: usize,

    /// Width of every token representation
    /// Must be divisible by --n-heads
    #[arg(long, default_value_t = 64)]
    pub d_model: usize,

    /// Inner width of the feed-forward block
    #[arg(long, default_value_t = 256)]
    pub d_ff: usize,

    /// Number of attention heads
    #[arg(long, default_value_t = 4)]
    pub n_heads: usize,

    /// Dropout probability (inactive on the inference backend)
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Longest sequence the positional encoding covers
    #[arg(long, default_value_t = 5000)]
    pub max_len: usize,

    /// Sequences per batch
    #[arg(long, default_value_t = 2)]
    pub batch_size: usize,

    /// Source sequence length
    #[arg(long, default_value_t = 10)]
    pub src_len: usize,

    /// Target sequence length
    #[arg(long, default_value_t = 8)]
    pub tgt_len: usize,

    /// Seed for parameter init and token sampling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<&InspectArgs> for TransformerConfig {
    fn from(a: &InspectArgs) -> Self {
        TransformerConfig::new(a.src_vocab, a.tgt_vocab)
            .with_n_layers(a.n_layers)
            .with_d_model(a.d_model)
            .with_d_ff(a.d_ff)
            .with_n_heads(a.n_heads)
            .with_dropout(a.dropout)
            .with_max_len(a.max_len)
    }
}

impl From<&InspectArgs> for InspectConfig {
    fn from(a: &InspectArgs) -> Self {
        InspectConfig {
            batch_size: a.batch_size,
            src_len:    a.src_len,
            tgt_len:    a.tgt_len,
            seed:       a.seed,
            ..Default::default()
        }
    }
}

/// All arguments for the `mask` command
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Sequence length (the mask is size x size)
    #[arg(long, default_value_t = 4)]
    pub size: usize,
}
