//! Command-line surface for the tasklist binary.

use clap::{Parser, Subcommand, ValueEnum};
use tasklist_core::{SortKey, TaskId};

/// Task tracker with automatic category and priority classification
#[derive(Debug, Parser)]
#[command(name = "tasklist", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify and store a new task
    Add {
        /// Task description; multiple words are joined with spaces
        #[arg(required = true, num_args = 1.., value_name = "DESCRIPTION")]
        description: Vec<String>,
    },

    /// List stored tasks
    List {
        /// Only show tasks that are not done
        #[arg(long)]
        hide_completed: bool,

        /// Ordering of the list
        #[arg(short, long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Flip the completion state of a task
    Toggle { id: TaskId },

    /// Mark a task as done
    Done { id: TaskId },

    /// Mark a task as not done
    Undone { id: TaskId },

    /// Permanently delete a task
    Delete { id: TaskId },

    /// Show completion statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Newest,
    Priority,
    Category,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Newest => SortKey::Newest,
            SortArg::Priority => SortKey::Priority,
            SortArg::Category => SortKey::Category,
        }
    }
}
