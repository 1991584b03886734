//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/get/update-status/delete over the `tasks` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every operation checks out one pooled connection and runs one statement.
//! - Writes to a missing id return `RepoError::NotFound`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{ConnectionPool, DbError};
use crate::model::task::{Category, NewTask, Priority, Task, TaskId};
use log::{debug, error};
use rusqlite::{params, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const TASK_COLUMNS: &str = "id, description, category, priority, done, created_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl RepoError {
    /// Whether this error comes from the storage layer rather than a missing row.
    pub fn is_storage(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Appends one task with `done = false` and returns the stored row.
    fn insert_task(&self, task: &NewTask) -> RepoResult<Task>;
    /// Lists every task, newest first.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn set_done(&self, id: TaskId, done: bool) -> RepoResult<()>;
    /// Hard-deletes one task.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'pool> {
    pool: &'pool ConnectionPool,
}

impl<'pool> SqliteTaskRepository<'pool> {
    pub fn new(pool: &'pool ConnectionPool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &NewTask) -> RepoResult<Task> {
        let started_at = Instant::now();
        let conn = self.pool.acquire()?;

        let inserted = conn
            .query_row(
                &format!(
                    "INSERT INTO tasks (description, priority, category)
                     VALUES (?1, ?2, ?3)
                     RETURNING {TASK_COLUMNS};"
                ),
                params![
                    task.description.as_str(),
                    task.priority.as_str(),
                    task.category.as_str(),
                ],
                |row| Ok(parse_task_row(row)),
            )
            .map_err(RepoError::from)
            .and_then(|parsed| parsed);

        match &inserted {
            Ok(stored) => debug!(
                "event=task_insert module=repo status=ok task_id={} duration_ms={}",
                stored.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=task_insert module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }

        inserted
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let conn = self.pool.acquire()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             ORDER BY created_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let conn = self.pool.acquire()?;
        let row = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1;"),
                [id],
                |row| Ok(parse_task_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn set_done(&self, id: TaskId, done: bool) -> RepoResult<()> {
        let conn = self.pool.acquire()?;
        let changed = conn.execute(
            "UPDATE tasks SET done = ?1 WHERE id = ?2;",
            params![bool_to_int(done), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let conn = self.pool.acquire()?;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in tasks.category"
        ))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done"
            )));
        }
    };

    Ok(Task {
        id: row.get("id")?,
        description: row.get("description")?,
        category,
        priority,
        done,
        created_at: row.get("created_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
