//! tasklist binary entry point.
//!
//! # Responsibility
//! - Load configuration and wire logging, storage and the classifier.
//! - Dispatch one subcommand and map failures to a non-zero exit code.
//!
//! # Invariants
//! - A blank `add` is rejected before the store is opened.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use tasklist_core::{
    init_logging, validate_description, AppConfig, Classifier, ConfigError, ConnectionPool,
    DbError, SqliteTaskRepository, Task, TaskListQuery, TaskService, TaskServiceError, TaskStats,
    TaskValidationError,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Rejected(err)) => {
            eprintln!("warning: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Failures that end the process with a non-zero exit code.
#[derive(Debug)]
enum CliError {
    /// Input rejected before any store access.
    Rejected(TaskValidationError),
    Config(ConfigError),
    Store(DbError),
    Service(TaskServiceError),
    Output(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Store(err) => write!(f, "failed to open task store: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to encode JSON: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<TaskServiceError> for CliError {
    fn from(value: TaskServiceError) -> Self {
        match value {
            TaskServiceError::Validation(err) => Self::Rejected(err),
            other => Self::Service(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // A missing .env file is the normal case.
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().map_err(CliError::Config)?;

    if let Some(log_dir) = config.logging.log_dir.as_deref() {
        if let Err(err) = init_logging(config.logging.level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        env!("CARGO_PKG_VERSION")
    );

    let result = execute(&config, cli.command);
    match &result {
        Ok(()) => {}
        Err(CliError::Rejected(err)) => {
            warn!("event=cli_command module=cli status=rejected error={err}")
        }
        Err(err) => error!("event=cli_command module=cli status=error error={err}"),
    }
    result
}

/// Validates `command`, then opens the store and runs it.
fn execute(config: &AppConfig, command: Command) -> Result<(), CliError> {
    precheck(&command).map_err(CliError::Rejected)?;

    let pool = ConnectionPool::new(config.db.target.clone(), config.db.pool_size)
        .map_err(CliError::Store)?;
    let service = TaskService::new(
        SqliteTaskRepository::new(&pool),
        Classifier::from_config(&config.classifier),
    );

    dispatch(&service, command)
}

/// Input checks that need neither the store nor the classifier.
fn precheck(command: &Command) -> Result<(), TaskValidationError> {
    match command {
        Command::Add { description } => validate_description(&description.join(" ")),
        _ => Ok(()),
    }
}

fn dispatch(
    service: &TaskService<SqliteTaskRepository<'_>>,
    command: Command,
) -> Result<(), CliError> {
    match command {
        Command::Add { description } => {
            let task = service.add_task(&description.join(" "))?;
            println!(
                "added #{} [{} / {}] {}",
                task.id, task.category, task.priority, task.description
            );
        }
        Command::List {
            hide_completed,
            sort,
            json,
        } => {
            let query = TaskListQuery {
                show_completed: !hide_completed,
                sort: sort.into(),
            };
            let tasks = service.list(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_tasks(&tasks);
            }
        }
        Command::Toggle { id } => {
            let task = service.toggle(id)?;
            println!("#{} is now {}", task.id, status_label(task.done));
        }
        Command::Done { id } => {
            service.set_done(id, true)?;
            println!("#{id} is now {}", status_label(true));
        }
        Command::Undone { id } => {
            service.set_done(id, false)?;
            println!("#{id} is now {}", status_label(false));
        }
        Command::Delete { id } => {
            service.remove(id)?;
            println!("deleted #{id}");
        }
        Command::Stats { json } => {
            let stats = service.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }
    Ok(())
}

fn status_label(done: bool) -> &'static str {
    if done {
        "done"
    } else {
        "pending"
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in tasks {
        println!("{}", format_task_line(task));
    }
}

fn format_task_line(task: &Task) -> String {
    format!(
        "[{}] #{:<4} {:<8} {:<6} {}",
        if task.done { "x" } else { " " },
        task.id,
        task.category.as_str(),
        task.priority.as_str(),
        task.description
    )
}

fn print_stats(stats: &TaskStats) {
    println!("total:      {}", stats.total);
    println!("completed:  {}", stats.completed);
    println!("pending:    {}", stats.pending);
    println!("completion: {:.1}%", stats.completion_rate);
    for (category, count) in &stats.by_category {
        println!("  {:<8} {}", category.as_str(), count);
    }
}
