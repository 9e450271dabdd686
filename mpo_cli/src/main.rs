//! # mpo
//!
//! Inspect, repair, export and convert motion profile documents.
//!
//! # Usage
//!
//! ```bash
//! # Summary of every motor, with constraint violations
//! mpo info show.json
//!
//! # Pull every motor back inside its limits
//! mpo repair show.json -o show_fixed.json
//!
//! # 500 Hz samples up to the last node
//! mpo export show.json samples.toml --rate 500
//!
//! # JSON -> TOML
//! mpo convert show.json show.toml
//! ```

#![deny(warnings)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mpo_cli::{DocumentSummary, export_request, load_config, open, repair};
use mpo_common::prelude::LogLevel;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Motion profile document tools
#[derive(Parser, Debug)]
#[command(name = "mpo")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Inspect, repair, export and convert motion profile documents")]
#[command(long_about = None)]
struct Args {
    /// Editor configuration file (defaults to ./mpo.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a summary of a document
    Info {
        /// Document file (.json or .toml)
        input: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        as_json: bool,
    },
    /// Run the constraint repair sweep and save the result
    Repair {
        input: PathBuf,
        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Repair only this motor
        #[arg(short, long)]
        motor: Option<String>,
    },
    /// Write fixed-rate samples of every motor
    Export {
        input: PathBuf,
        output: PathBuf,
        /// Sample rate [Hz]
        #[arg(long)]
        rate: Option<f64>,
        /// End time [ms]
        #[arg(long)]
        end: Option<f64>,
        /// Document id written into the export
        #[arg(long)]
        id: Option<String>,
    },
    /// Re-save a document in the format of the output extension
    Convert { input: PathBuf, output: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("mpo failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref());
    let level = config
        .as_ref()
        .map_or(LogLevel::Info, |c| c.shared.log_level);
    setup_tracing(&args, level);
    let config = config?;

    info!("mpo v{} ({})", env!("CARGO_PKG_VERSION"), config.shared.service_name);

    match &args.command {
        Cmd::Info { input, as_json } => {
            let session = open(&config, input)?;
            let summary = DocumentSummary::new(session.document(), session.document_id());
            if *as_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{summary}");
            }
            if summary.has_violations() {
                warn!("Document has constraint violations; run `mpo repair`");
            }
        }
        Cmd::Repair {
            input,
            output,
            motor,
        } => {
            let mut session = open(&config, input)?;
            let changed = repair(&mut session, motor.as_deref())?;
            let target = output.as_ref().unwrap_or(input);
            session.save(target)?;
            println!("{changed} motor(s) repaired, saved to {}", target.display());
        }
        Cmd::Export {
            input,
            output,
            rate,
            end,
            id,
        } => {
            let session = open(&config, input)?;
            let request = export_request(&session, *rate, *end, id.as_deref());
            session.export_with(output, &request)?;
            println!(
                "Exported {} motor(s) at {} Hz to {}",
                session.document().len(),
                request.sample_rate_hz,
                output.display()
            );
        }
        Cmd::Convert { input, output } => {
            let session = open(&config, input)?;
            session.save(output)?;
            println!("{} -> {}", input.display(), output.display());
        }
    }

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
