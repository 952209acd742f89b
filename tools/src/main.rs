//! Command-line driver for the denoiser core.

mod input;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use denoiser_core::{Config, Denoiser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "denoiser", about = "Post-OCR text denoiser")]
struct Args {
    /// Model store database.
    #[arg(long, default_value = "models/denoiser.redb")]
    models: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train all models from labelled CSV documents.
    Train {
        /// Input CSV files with `line,label` rows.
        #[arg(long, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Newline-separated accepted-word list.
        #[arg(long)]
        word_list: PathBuf,
    },

    /// Build the inline correction indices without touching the classifier.
    Index {
        #[arg(long, num_args = 1..)]
        inputs: Vec<PathBuf>,

        #[arg(long)]
        word_list: PathBuf,

        /// Treat inputs as labelled CSV instead of plain text.
        #[arg(long)]
        csv: bool,
    },

    /// Classify documents and write the clean, garbage and unclassified
    /// sections next to each other.
    Cleanse {
        #[arg(long, num_args = 1..)]
        inputs: Vec<PathBuf>,

        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Treat inputs as labelled CSV instead of plain text.
        #[arg(long)]
        csv: bool,
    },

    /// Cleanse labelled CSV documents and print the classification report
    /// as JSON.
    Score {
        #[arg(long, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match args.command {
        Command::Train { inputs, word_list } => {
            let words = input::read_word_list(&word_list)?;
            let mut documents = inputs
                .iter()
                .map(|path| input::read_csv(path))
                .collect::<Result<Vec<_>>>()?;

            let mut denoiser = Denoiser::open(&args.models, config)?;
            denoiser.train(&mut documents, &words)?;
            println!("trained on {} document(s)", documents.len());
        }

        Command::Index {
            inputs,
            word_list,
            csv,
        } => {
            let words = input::read_word_list(&word_list)?;
            let documents = read_documents(&inputs, csv)?;

            let mut denoiser = Denoiser::open(&args.models, config)?;
            denoiser.ingest(&documents, &words)?;
            println!("indexed {} document(s)", documents.len());
        }

        Command::Cleanse {
            inputs,
            out_dir,
            csv,
        } => {
            let denoiser = Denoiser::open(&args.models, config)?;
            for path in &inputs {
                let mut document = if csv {
                    input::read_csv(path)?
                } else {
                    input::read_txt(path)?
                };
                denoiser.cleanse(&mut document)?;
                output::write_sections(&document, &out_dir)?;
            }
            println!("cleansed {} document(s) into {}", inputs.len(), out_dir.display());
        }

        Command::Score { inputs } => {
            let denoiser = Denoiser::open(&args.models, config)?;
            for path in &inputs {
                let mut document = input::read_csv(path)?;
                denoiser.cleanse(&mut document)?;
                let report = document.score_report();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "document": document.name,
                        "report": report,
                    }))?
                );
            }
        }
    }

    Ok(())
}

fn read_documents(paths: &[PathBuf], csv: bool) -> Result<Vec<denoiser_core::Document>> {
    paths
        .iter()
        .map(|path| if csv { input::read_csv(path) } else { input::read_txt(path) })
        .collect()
}
