//! Foreman CLI: dependency-aware work coordination with run lifecycles.
//!
//! Subcommands map one-to-one onto the lifecycle operations. Outcomes print
//! as JSON on stdout so the CLI composes with scripts; errors print their
//! code, message, and suggestion on stderr.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use foreman::checkpoint::{CheckpointOptions, update_checkpoint};
use foreman::error::ForemanError;
use foreman::finish::{CompleteRunParams, complete_run};
use foreman::io::init::{InitOptions, init_project};
use foreman::model::Scope;
use foreman::start::{WorkItemSpec, init_run};
use foreman::{advance, exit_codes, logging, select};

#[derive(Parser)]
#[command(
    name = "foreman",
    version,
    about = "Dependency-aware work coordination with run lifecycles and approval checkpoints"
)]
struct Cli {
    /// Project root directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.foreman/` scaffolding (state document, config, runs dir).
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Start a run over one or more work items.
    Start {
        /// Work item as `id:intent:mode`; repeatable, in execution order.
        #[arg(long = "item", value_name = "ID:INTENT:MODE", required = true)]
        items: Vec<String>,
        /// Override the derived scope.
        #[arg(long)]
        scope: Option<ScopeArg>,
    },
    /// Complete the active run's current item and advance the cursor.
    CompleteItem {
        run_id: String,
    },
    /// Finalize the active run: complete everything, record history, close.
    CompleteRun {
        run_id: String,
        #[arg(long = "file-created", value_name = "PATH")]
        files_created: Vec<String>,
        #[arg(long = "file-modified", value_name = "PATH")]
        files_modified: Vec<String>,
        #[arg(long = "decision", value_name = "TEXT")]
        decisions: Vec<String>,
        #[arg(long, default_value_t = 0)]
        tests_added: u32,
        #[arg(long, default_value_t = 0)]
        coverage: u32,
    },
    /// Set the checkpoint state on an item in the active run.
    Checkpoint {
        run_id: String,
        /// Target state; synonyms such as `waiting` are accepted.
        state: String,
        /// Item to address instead of the current item.
        #[arg(long)]
        item: Option<String>,
        /// Gate name to stamp on the item.
        #[arg(long)]
        checkpoint: Option<String>,
    },
    /// Print schedulable work, unblocked first, by what it unlocks.
    UpNext,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    Single,
    Batch,
    Wide,
}

impl From<ScopeArg> for Scope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Single => Self::Single,
            ScopeArg::Batch => Self::Batch,
            ScopeArg::Wide => Self::Wide,
        }
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = cli.root;
    match cli.command {
        Command::Init { force } => {
            let paths = init_project(&root, &InitOptions { force })?;
            println!("initialized {}", paths.foreman_dir.display());
        }
        Command::Start { items, scope } => {
            let specs = items
                .iter()
                .map(|raw| parse_item_spec(raw))
                .collect::<Result<Vec<_>>>()?;
            let outcome = init_run(&root, &specs, scope.map(Scope::from))?;
            print_json(&outcome)?;
        }
        Command::CompleteItem { run_id } => {
            let outcome = advance::complete_current_item(&root, &run_id)?;
            print_json(&outcome)?;
        }
        Command::CompleteRun {
            run_id,
            files_created,
            files_modified,
            decisions,
            tests_added,
            coverage,
        } => {
            let params = CompleteRunParams {
                files_created,
                files_modified,
                decisions,
                tests_added,
                coverage_percent: coverage,
            };
            let outcome = complete_run(&root, &run_id, &params)?;
            print_json(&outcome)?;
        }
        Command::Checkpoint {
            run_id,
            state,
            item,
            checkpoint,
        } => {
            let options = CheckpointOptions {
                item_id: item,
                checkpoint,
            };
            let outcome = update_checkpoint(&root, &run_id, &state, &options)?;
            print_json(&outcome)?;
        }
        Command::UpNext => {
            let ordered = select::up_next_from_root(&root)?;
            print_json(&ordered)?;
            if ordered.is_empty() {
                return Ok(exit_codes::ALL_CLEAR);
            }
        }
    }
    Ok(exit_codes::OK)
}

/// Parse `id:intent:mode` into a work-item spec. Mode validity is checked by
/// the lifecycle operation, not here.
fn parse_item_spec(raw: &str) -> Result<WorkItemSpec> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(intent), Some(mode)) => Ok(WorkItemSpec {
            id: id.to_string(),
            intent: intent.to_string(),
            mode: mode.to_string(),
        }),
        _ => bail!("work item '{raw}' must be id:intent:mode"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize outcome")?;
    println!("{payload}");
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ForemanError>() {
        Some(foreman_err) => {
            eprintln!("{}: {}", foreman_err.code, foreman_err.message);
            eprintln!("suggestion: {}", foreman_err.suggestion);
        }
        None => eprintln!("{err:#}"),
    }
}
