//! Phishing dataset preprocessing CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dataset::{preprocess_file, LabeledDataset};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prepare phishing URL datasets for training
#[derive(Debug, Parser)]
#[command(name = "phishing-preprocess")]
#[command(about = "Extract URL features and prepare per-client training data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn a raw URL/label CSV into a feature CSV.
    Process {
        /// CSV with a URL column and a label column.
        #[arg(long)]
        input: PathBuf,

        /// Destination for the feature table.
        #[arg(long)]
        output: PathBuf,
    },

    /// Write the slice of a processed table owned by one client.
    Partition {
        /// Processed feature CSV.
        #[arg(long)]
        input: PathBuf,

        /// Zero-based client index.
        #[arg(long)]
        client_id: usize,

        /// Number of participating clients.
        #[arg(long)]
        total_clients: usize,

        /// Destination for the client's slice.
        #[arg(long)]
        output: PathBuf,
    },

    /// Fit a standard scaler on a processed table and save it as JSON.
    FitScaler {
        /// Processed feature CSV.
        #[arg(long)]
        input: PathBuf,

        /// Destination for the scaler JSON.
        #[arg(long)]
        output: PathBuf,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Process { input, output } => {
            let processed = preprocess_file(&input, &output)
                .with_context(|| format!("preprocessing {}", input.display()))?;
            info!("Processed {} rows", processed.len());
        }
        Command::Partition {
            input,
            client_id,
            total_clients,
            output,
        } => {
            let part = LabeledDataset::load_partition(&input, client_id, total_clients)
                .with_context(|| format!("partitioning {}", input.display()))?;
            part.write_to_path(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(
                "Client {} slice: {} rows ({} phishing)",
                client_id,
                part.len(),
                part.positives()
            );
        }
        Command::FitScaler { input, output } => {
            let data = LabeledDataset::load(&input)
                .with_context(|| format!("loading {}", input.display()))?;
            let scaler = data.fit_scaler()?;
            scaler
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("Scaler for {} features saved to {}", scaler.dimension(), output.display());
        }
    }
    Ok(())
}

fn main() {
    init_logging();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("phishing-preprocess error: {:#}", err);
        std::process::exit(1);
    }
}
