#![forbid(unsafe_code)]
//! Build, print and verify an in-memory FrameChain ledger.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use framechain::blockchain::{Ledger, Verification};
use framechain::cli::{
    init_tracing, load_config_or_default, new_ledger_with_records, render_json, render_table,
    render_text, tampered_copy,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Builds a ledger from the given records, prints it and verifies it
    Build {
        /// Records to append after the genesis block
        records: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Builds a ledger, damages one byte of a stored frame and verifies the copy
    Tamper {
        /// Records to append after the genesis block
        records: Vec<String>,
        /// Height of the block to damage
        #[arg(long)]
        height: u64,
        /// Byte offset inside that block's frame
        #[arg(long, default_value_t = 88)]
        byte: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging.level)?;

    match &cli.command {
        Commands::Build { records, format } => {
            let ledger = new_ledger_with_records(&config, records.as_slice())?;
            build(&ledger, *format)?;
        }
        Commands::Tamper {
            records,
            height,
            byte,
        } => {
            let ledger = new_ledger_with_records(&config, records.as_slice())?;
            tamper(&ledger, *height, *byte)?;
        }
    }

    Ok(())
}

fn build(ledger: &Ledger, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let blocks = ledger.blocks()?;
    let verification = ledger.verify_chain()?;

    match format {
        Format::Json => {
            println!("{}", render_json(&blocks, &verification)?);
            return Ok(());
        }
        Format::Table => println!("{}", render_table(&blocks)),
        Format::Text => println!("{}", render_text(&blocks)),
    }

    println!();
    print_verification(&verification);
    Ok(())
}

fn tamper(ledger: &Ledger, height: u64, byte: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "Original chain".bright_cyan().bold());
    print_verification(&ledger.verify_chain()?);

    let damaged = tampered_copy(ledger, height, byte)?;
    println!();
    println!(
        "{}",
        format!("After flipping byte {} of block {}", byte, height)
            .bright_cyan()
            .bold()
    );
    print_verification(&damaged.verify_chain()?);
    Ok(())
}

fn print_verification(verification: &Verification) {
    match verification {
        Verification::Valid { .. } => println!("{}", verification.to_string().bright_green()),
        Verification::Invalid { .. } => println!("{}", verification.to_string().red().bold()),
    }
}
