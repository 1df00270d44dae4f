use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use report_canvas::config::{CanvasConfig, ConfigError};
use report_canvas::editor::{Action, EditorCore};
use report_canvas::report::{LayoutError, Report};
use tracing_subscriber::EnvFilter;

mod script;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid canvas config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("script refers to block #{0}, but the report has fewer blocks")]
    UnknownBlockIndex(usize),
}

#[derive(Parser, Debug)]
#[command(name = "canvas-cli", about = "Replay canvas gestures against report JSON files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a gesture script against a report and write the result.
    Replay {
        #[arg(long, env = "CANVAS_REPORT")]
        report: PathBuf,
        #[arg(long)]
        script: PathBuf,
        /// Where to write the updated report; stdout when absent.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print every emitted action to stderr.
        #[arg(long)]
        actions: bool,
    },
    /// List blocks in draw order with their placement.
    Inspect {
        #[arg(long, env = "CANVAS_REPORT")]
        report: PathBuf,
    },
}

/// Build the log filter from `RUST_LOG`-style directives.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<(), CliError> {
    // .env may carry RUST_LOG, so load it before the subscriber reads the filter.
    let dotenv = dotenvy::dotenv();
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    let config = CanvasConfig::from_env()?;

    match cli.command {
        Command::Replay { report, script, output, actions } => {
            run_replay(&config, &report, &script, output.as_deref(), actions)
        }
        Command::Inspect { report } => run_inspect(&config, &report),
    }
}

fn read_report(path: &Path) -> Result<Report, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&text)?)
}

fn run_replay(
    config: &CanvasConfig,
    report_path: &Path,
    script_path: &Path,
    output: Option<&Path>,
    print_actions: bool,
) -> Result<(), CliError> {
    let mut report = read_report(report_path)?;
    let script_text =
        fs::read_to_string(script_path).map_err(|source| CliError::Read { path: script_path.to_path_buf(), source })?;
    let steps = script::parse(&script_text)?;

    let mut editor = EditorCore::with_blocks(config, std::mem::take(&mut report.blocks));
    let actions = script::run(&mut editor, &steps)?;
    // Release any gesture the script left open so its result is kept.
    let trailing = editor.on_pointer_up();

    let committed = actions
        .iter()
        .chain(&trailing)
        .filter(|a| matches!(a, Action::PositionCommitted { .. }))
        .count();
    tracing::info!(steps = steps.len(), actions = actions.len(), committed, "replay finished");
    if print_actions {
        for action in actions.iter().chain(&trailing) {
            eprintln!("{action:?}");
        }
    }

    report.blocks = editor.layout.into_blocks();
    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => fs::write(path, json).map_err(|source| CliError::Write { path: path.to_path_buf(), source }),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn run_inspect(config: &CanvasConfig, report_path: &Path) -> Result<(), CliError> {
    let report = read_report(report_path)?;
    let editor = EditorCore::with_blocks(config, report.blocks);
    println!("{}: {} block(s)", report.name, editor.layout.len());
    for block in editor.layout.blocks_by_z() {
        let p = block.position;
        println!(
            "z={:<4} {} {:<13} x={} y={} w={} h={} rot={}{}",
            p.z_index,
            block.id,
            format!("{:?}", block.kind()).to_lowercase(),
            p.x,
            p.y,
            p.width,
            p.height,
            p.rotation,
            if block.locked { " locked" } else { "" },
        );
    }
    Ok(())
}
