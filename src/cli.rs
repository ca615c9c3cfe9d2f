use crate::engine::step::{RunStateCell, SpeedSetting, StepEmitter, DEFAULT_SPEED};
use crate::engine::SortEngine;
use crate::input;
use crate::model::{
    format_value, Algorithm, Operation, Pacing, RunConfig, RunState, RunSummary, SortEvent,
};
use crate::sequence::SequenceStore;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sortviz",
    version,
    about = "Step-by-step sorting algorithm visualizer with optional TUI"
)]
pub struct Cli {
    /// Sorting algorithm to animate
    #[arg(long, value_enum, default_value_t = Algorithm::Bubble)]
    pub algorithm: Algorithm,

    /// Number of elements in a generated array (clamped to 5..=120)
    #[arg(long, default_value_t = input::DEFAULT_SIZE)]
    pub size: usize,

    /// Comma-separated values to sort instead of a random array
    #[arg(long)]
    pub values: Option<String>,

    /// Animation speed, 1 (slowest) to 50 (fastest)
    #[arg(long, default_value_t = DEFAULT_SPEED, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub speed: u8,

    /// Print a text trace and summary, then exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print the run summary and full operation log as JSON, then exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Skip the delay between operations
    #[arg(long)]
    pub instant: bool,

    /// Start sorting as soon as the TUI opens
    #[arg(long)]
    pub start_on_launch: bool,

    /// Seed for random array generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append logs to this file (the TUI does not log otherwise)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive"));
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            if let Some(path) = args.log_file.as_deref() {
                crate::logging::init_file(path)?;
            }
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            crate::logging::init_stderr();
            return run_text(args).await;
        }
    }

    match args.log_file.as_deref() {
        Some(path) => crate::logging::init_file(path)?,
        None => crate::logging::init_stderr(),
    }

    if args.json {
        return run_json(args).await;
    }

    run_text(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    let values = args
        .values
        .as_deref()
        .and_then(|text| match input::parse_csv_values(text) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{e}; using a random array");
                None
            }
        });
    RunConfig {
        algorithm: args.algorithm,
        size: input::clamp_size(args.size),
        values,
        speed: args.speed,
        pacing: if args.json || args.instant {
            Pacing::Instant
        } else {
            Pacing::Live
        },
        seed: args.seed,
    }
}

/// Spawn a single headless run and return its event stream and task handle.
fn spawn_headless(
    cfg: &RunConfig,
) -> Result<(
    mpsc::UnboundedReceiver<SortEvent>,
    tokio::task::JoinHandle<Result<(SequenceStore, RunSummary)>>,
)> {
    let values = cfg
        .values
        .clone()
        .unwrap_or_else(|| input::random_values(cfg.size, cfg.seed));
    let store = SequenceStore::new(values).context("invalid input array")?;

    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<SortEvent>();
    let state = RunStateCell::default();
    state.store(RunState::Running);
    let emitter = StepEmitter::new(evt_tx, SpeedSetting::new(cfg.speed), state, cfg.pacing);

    let engine = SortEngine::new(cfg.algorithm);
    let handle = tokio::spawn(async move { engine.run(store, emitter).await });
    Ok((evt_rx, handle))
}

#[derive(Serialize)]
struct JsonReport {
    #[serde(flatten)]
    summary: RunSummary,
    operations: Vec<Operation>,
}

async fn run_json(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let (mut evt_rx, handle) = spawn_headless(&cfg)?;

    let mut operations = Vec::new();
    while let Some(ev) = evt_rx.recv().await {
        if let SortEvent::Step { op, .. } = ev {
            operations.push(op);
        }
    }

    let (_, summary) = handle
        .await
        .context("sort task failed")?
        .context("sort failed")?;

    let out = serde_json::to_string_pretty(&JsonReport {
        summary,
        operations,
    })?;
    println!("{out}");
    Ok(())
}

async fn run_text(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let (out_tx, out_handle) = spawn_output_writer();
    let (mut evt_rx, handle) = spawn_headless(&cfg)?;
    let abort = handle.abort_handle();

    let mut step = 0u64;
    loop {
        tokio::select! {
            ev = evt_rx.recv() => {
                let Some(ev) = ev else { break };
                if let SortEvent::Step { op, snapshot } = ev {
                    step += 1;
                    let bars = snapshot
                        .iter()
                        .map(|v| format_value(*v))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let _ = out_tx.send(OutputLine::Stderr(format!(
                        "[{step:>5}] {:<24} | {bars}",
                        op.describe()
                    )));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                abort.abort();
                let _ = out_tx.send(OutputLine::Stderr("Interrupted".into()));
                drop(out_tx);
                let _ = out_handle.await;
                return Ok(());
            }
        }
    }

    let (_, summary) = handle.await??;

    for line in crate::text_summary::build_text_summary(&summary).lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}
