//! Command-line interface for tasklist
//!
//! This module defines the CLI structure using clap derive macros.
//! Task commands live in `task`, the interactive list in `crate::ui`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::FileStorage;
use crate::store::TaskStore;

mod task;

/// tasklist - a small persistent task list
///
/// Add, complete, and delete short text tasks. Tasks are stored as a JSON
/// array in a single slot under the data directory.
#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the task collection
    #[arg(long, global = true, env = "TASKLIST_DIR")]
    pub dir: Option<PathBuf>,

    /// Configuration file (defaults to <dir>/tasklist.toml)
    #[arg(long, global = true, env = "TASKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all tasks in stored order
    #[command(visible_alias = "ls")]
    List,

    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Mark a task completed, or active again if it already is
    #[command(visible_aliases = ["complete", "undo"])]
    Toggle {
        /// Task id
        id: i64,
    },

    /// Delete a task (irreversible)
    #[command(visible_alias = "rm")]
    Delete {
        /// Task id
        id: i64,
    },

    /// Interactive terminal task list
    Ui,
}

impl Commands {
    /// Canonical command name reported in JSON output
    pub fn name(&self) -> &'static str {
        match self {
            Commands::List => "list",
            Commands::Add { .. } => "add",
            Commands::Toggle { .. } => "toggle",
            Commands::Delete { .. } => "delete",
            Commands::Ui => "ui",
        }
    }
}

/// Resolved settings shared by every command
#[derive(Debug, Clone)]
pub(crate) struct CliContext {
    pub(crate) config: Config,
    pub(crate) output: OutputOptions,
}

impl CliContext {
    pub(crate) fn resolve(
        dir: Option<&Path>,
        config: Option<&Path>,
        output: OutputOptions,
    ) -> Result<Self> {
        let config = Config::resolve(config, dir)?;
        Ok(Self { config, output })
    }

    pub(crate) fn open_store(&self) -> Result<TaskStore<FileStorage>> {
        let dir = self.config.data_dir()?;
        tracing::debug!(dir = %dir.display(), key = %self.config.storage.key, "opening task store");
        Ok(TaskStore::with_key(
            FileStorage::new(dir),
            self.config.storage.key.clone(),
        ))
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = CliContext::resolve(self.dir.as_deref(), self.config.as_deref(), output)?;

        match self.command {
            Commands::List => task::run_list(&ctx),
            Commands::Add { text } => task::run_add(&ctx, &text.join(" ")),
            Commands::Toggle { id } => task::run_toggle(&ctx, id),
            Commands::Delete { id } => task::run_delete(&ctx, id),
            Commands::Ui => crate::ui::run(ctx.open_store()?),
        }
    }
}
