//! CLI for running hash throughput benchmarks.
//!
//! Usage:
//!   hash-bench                  # Run all hashes
//!   hash-bench --list           # List available hashes
//!   hash-bench FNV-1a-32        # Run a specific hash
//!   hash-bench --csv data.csv   # Export measured speeds to CSV
//!   hash-bench --help           # Show help

use clap::Parser;
use hash_throughput::config::BenchConfig;
use hash_throughput::registry::{build_registry, BenchmarkCase};
use hash_throughput::utils::runner::{export_csv, run_benchmarks, RunOptions};
use hash_throughput::utils::time_seed;
use hash_throughput::utils::tui::{self, Console};
use hash_throughput::{BenchError, Result};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hash throughput benchmarks", long_about = None)]
struct Args {
    /// Run only this hash (case-insensitive)
    hash: Option<String>,

    /// List available hashes and exit
    #[arg(short, long)]
    list: bool,

    /// Key length of the bulk sweep, in bytes
    #[arg(long, default_value_t = hash_throughput::config::BULK_KEY_LENGTH)]
    key_length: usize,

    /// Repetitions per bulk measurement
    #[arg(long, default_value_t = hash_throughput::config::BULK_REPETITIONS)]
    repetitions: usize,

    /// Untimed averaging runs before each sweep
    #[arg(long, default_value_t = hash_throughput::config::WARMUP_ITERATIONS)]
    warmup: usize,

    /// Seed for the key filler (default: time-derived)
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the bulk sweep
    #[arg(long)]
    skip_bulk: bool,

    /// Skip the chunk sweep
    #[arg(long)]
    skip_chunks: bool,

    /// Export measured speeds to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn run(args: Args) -> Result<()> {
    let registry = build_registry();

    if args.list {
        tui::print_available_hashes(&registry);
        return Ok(());
    }

    let cases: Vec<BenchmarkCase> = match &args.hash {
        Some(name) => {
            let case = registry
                .find(name)
                .ok_or_else(|| BenchError::UnknownHash(name.clone()))?;
            vec![*case]
        }
        None => registry.all().to_vec(),
    };

    let config = BenchConfig {
        key_length: args.key_length,
        repetitions: args.repetitions,
        warmup_iterations: args.warmup,
        seed: args.seed.unwrap_or_else(time_seed),
        ..BenchConfig::default()
    };
    let options = RunOptions {
        bulk: !args.skip_bulk,
        chunks: !args.skip_chunks,
    };

    tui::print_header();
    let results = run_benchmarks(&cases, &config, options, &mut Console)?;

    if let Some(path) = &args.csv {
        export_csv(path, &results)?;
        println!();
        println!("  Raw data exported to: {}", path);
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(BenchError::ClockResolution { resolution }) => {
            tracing::debug!(?resolution, "clock resolution check failed");
            eprintln!("The clock doesn't support high resolution.");
            ExitCode::from(1)
        }
        Err(err) => {
            if let BenchError::UnknownHash(_) = err {
                eprintln!("{}", err);
                eprintln!("Available: {:?}", build_registry().list_names());
            } else {
                eprintln!("Error: {}", err);
            }
            ExitCode::from(1)
        }
    }
}
