// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, hands the work to Layer 2, and prints the result.
//
// Two commands are supported:
//   1. `inspect` — build a model, run encode/decode/generate
//   2. `mask`    — print the causal mask grid
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, MaskArgs};
use seq2seq_transformer::{
    application::inspect_use_case::{ForwardReport, InspectUseCase},
    infra::config_store::ConfigStore,
    subsequent_mask_rows,
    TransformerConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-transformer",
    version,
    about = "Build an encoder-decoder Transformer and inspect its forward pass."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch. The CLI only routes and prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Inspect(args) => run_inspect(&args),
            Commands::Mask(args)    => run_mask(&args),
        }
    }
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let model_cfg = match &args.config {
        Some(path) => {
            tracing::info!("Loading model config from '{}'", path);
            ConfigStore::new(path).load()?
        }
        None => TransformerConfig::from(args),
    };

    if let Some(path) = &args.save_config {
        ConfigStore::new(path).save(&model_cfg)?;
        tracing::info!("Model config written to '{}'", path);
    }

    let report = InspectUseCase::new(model_cfg, args.into()).execute()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_mask(args: &MaskArgs) -> Result<()> {
    for row in subsequent_mask_rows(args.size) {
        let cells: Vec<&str> = row.iter().map(|&allowed| if allowed { "T" } else { "F" }).collect();
        println!("{}", cells.join(" "));
    }
    Ok(())
}

fn print_report(report: &ForwardReport) {
    let m = &report.model;
    println!(
        "Model: N={} d_model={} heads={} d_ff={} dropout={} ({} parameters)",
        m.n_layers, m.d_model, m.n_heads, m.d_ff, m.dropout, report.num_params
    );
    println!("  source ids      {:?}", report.src_shape);
    println!("  target ids      {:?}", report.tgt_shape);
    println!("  memory          {:?}", report.memory_shape);
    println!("  decoder output  {:?}", report.output_shape);
    println!("  log-probs       {:?}", report.log_prob_shape);
    println!();
    println!("{:>5} {:>4} {:>8} {:>10} {:>8}", "batch", "pos", "argmax", "log_prob", "mass");
    for p in &report.positions {
        println!(
            "{:>5} {:>4} {:>8} {:>10.4} {:>8.5}",
            p.batch, p.position, p.argmax_token, p.log_prob, p.total_mass
        );
    }
}
