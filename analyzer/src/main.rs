use analyzer::{decompress_file, huffman_file, load_config, resolve_store, Analyzer};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "Word statistics and Huffman compression for text files", long_about = None)]
struct Cli {
    /// Metric store directory (falls back to ANALYZER_STORE, then ./store)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// JSON file with statistics settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rarest words of a document and record it in the running metric
    Stats {
        #[arg(long)]
        input: PathBuf,
        /// Files or directories forming the document's collection
        #[arg(long)]
        collection: Vec<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rarest words of a whole collection
    Collection {
        /// Files or directories
        #[arg(long, required = true)]
        input: Vec<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Huffman encode a file, verify the round trip, optionally write the packed form
    Huffman {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Include the encoded bit string in the output
        #[arg(long, default_value_t = false)]
        show_bits: bool,
    },
    /// Restore a file written by `huffman --output`
    Decompress {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Show the running metric
    Metrics {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let store = resolve_store(cli.store);

    match cli.command {
        Commands::Stats { input, collection, limit } => {
            let analyzer = Analyzer::new(&store, load_config(cli.config.as_deref(), limit)?)?;
            print_json(&analyzer.document(&input, &collection)?)
        }
        Commands::Collection { input, limit } => {
            let analyzer = Analyzer::new(&store, load_config(cli.config.as_deref(), limit)?)?;
            print_json(&analyzer.collection(&input)?)
        }
        Commands::Huffman { input, output, show_bits } => {
            let mut summary = huffman_file(&input, output.as_deref())?;
            if !show_bits {
                summary.report.encoded.clear();
            }
            print_json(&summary)
        }
        Commands::Decompress { input, output } => {
            let n = decompress_file(&input, &output)?;
            tracing::info!(bytes = n, output = %output.display(), "decompressed");
            Ok(())
        }
        Commands::Metrics { top } => {
            let analyzer = Analyzer::new(&store, load_config(cli.config.as_deref(), None)?)?;
            match analyzer.metrics(top)? {
                Some(view) => print_json(&view),
                None => {
                    println!("no files processed yet");
                    Ok(())
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
