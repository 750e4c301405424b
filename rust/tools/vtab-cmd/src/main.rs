use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logger;

#[derive(Parser)]
#[command(name = "vtab-cmd")]
#[command(about = "Command-line utility for vtab buffers")]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v for verbose, -vv for very verbose)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample OpInfo buffer
    Sample {
        /// Number of operator entries to generate
        #[arg(short, long, default_value_t = 3)]
        entries: usize,

        /// Prefix the buffer with its byte length
        #[arg(long)]
        size_prefixed: bool,

        /// Frame the buffer as a checksummed message
        #[arg(long)]
        sealed: bool,

        /// Path to a JSON file with builder options
        #[arg(long)]
        options: Option<String>,

        /// Output file
        output: String,
    },

    /// Display a summary of a buffer's layout
    Inspect {
        /// The buffer starts with a size prefix
        #[arg(long)]
        size_prefixed: bool,

        /// The file holds a checksummed message
        #[arg(long)]
        sealed: bool,

        /// File to inspect
        path: String,
    },

    /// Verify an OpInfo buffer and print it as JSON
    Dump {
        /// The buffer starts with a size prefix
        #[arg(long)]
        size_prefixed: bool,

        /// The file holds a checksummed message
        #[arg(long)]
        sealed: bool,

        /// File to dump
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Sample {
            entries,
            size_prefixed,
            sealed,
            options,
            output,
        } => commands::sample::run(entries, size_prefixed, sealed, options, output),
        Commands::Inspect {
            size_prefixed,
            sealed,
            path,
        } => commands::inspect::run(cli.verbose, size_prefixed, sealed, path),
        Commands::Dump {
            size_prefixed,
            sealed,
            path,
        } => commands::dump::run(size_prefixed, sealed, path),
    }
}
