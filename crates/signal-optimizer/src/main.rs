//! Signal Optimization CLI
//!
//! Reads a traffic snapshot and prints recommended signal timings.
//!
//! Usage:
//!   optimize-signals < snapshot.json
//!   optimize-signals --input snapshot.json --pretty
//!   optimize-signals optimize --input snapshot.json --output plan.json --pretty
//!   optimize-signals sample --intersection-id int-1 --hour 8 --seed 42 | optimize-signals

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use signal_optimizer::{loader, optimize_now, simulator, FailureReport, OptimizerConfig};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "optimize-signals",
    about = "Recommend signal phase durations from a traffic snapshot",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Used when no command is given
    #[command(flatten)]
    optimize: OptimizeArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Optimize a snapshot (default when no command is given)
    Optimize(OptimizeArgs),
    /// Print a synthetic snapshot
    Sample(SampleArgs),
}

#[derive(Args, Debug, Default)]
struct OptimizeArgs {
    /// Snapshot JSON file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optimizer configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Intersection id for the snapshot
    #[arg(long, default_value = "int-sim")]
    intersection_id: String,

    /// Hour of day (0-23)
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(0..24))]
    hour: u32,

    /// Approaches currently held at red
    #[arg(long, value_delimiter = ',', default_values_t = ["east".to_string(), "west".to_string()])]
    red: Vec<String>,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries JSON only
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {e}");
    }

    let mut stdout = io::stdout().lock();
    match run(cli, io::stdin().lock(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Optimization failed: {e:#}");
            if let Err(report_err) = report_failure(&e, &mut stdout) {
                eprintln!("Failed to write failure report: {report_err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Dispatch a parsed command line; `input` stands in for stdin, `out` for stdout
fn run<R: Read, W: Write>(cli: Cli, input: R, out: &mut W) -> Result<()> {
    match cli.command.unwrap_or(Command::Optimize(cli.optimize)) {
        Command::Optimize(args) => run_optimize(&args, input, out),
        Command::Sample(args) => run_sample(&args, out),
    }
}

fn report_failure<W: Write>(err: &anyhow::Error, out: &mut W) -> Result<()> {
    write_json(out, &FailureReport::new(format!("{err:#}")), false)
}

fn run_optimize<R: Read, W: Write>(args: &OptimizeArgs, input: R, out: &mut W) -> Result<()> {
    let config = match &args.config {
        Some(path) => OptimizerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OptimizerConfig::default(),
    };

    let request = match &args.input {
        Some(path) => loader::load_request(path)?,
        None => loader::read_request(input)?,
    };

    let outcome = optimize_now(&request, &config);

    match &args.output {
        Some(path) => {
            info!("Writing result to {:?}", path);
            let file = File::create(path)?;
            write_json(BufWriter::new(file), &outcome, args.pretty)?;
        }
        None => write_json(out, &outcome, args.pretty)?,
    }

    Ok(())
}

fn run_sample<W: Write>(args: &SampleArgs, out: &mut W) -> Result<()> {
    let request = simulator::sample_seeded(args.seed, &args.intersection_id, args.hour, &args.red);
    info!(
        "Sampled {} directions for {} at {:02}:00",
        request.traffic_data.len(),
        request.intersection_id,
        args.hour
    );
    write_json(out, &request, true)
}

fn write_json<W: Write, T: serde::Serialize>(mut writer: W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
