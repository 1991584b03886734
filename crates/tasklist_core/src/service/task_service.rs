//! Task use-case service.
//!
//! # Responsibility
//! - Run the classify-then-persist pipeline for new tasks.
//! - Provide status, delete and list entry points for presentation callers.
//!
//! # Invariants
//! - Blank descriptions are rejected before any classifier or storage call.
//! - Classification always completes before the insert; there is no
//!   insert-then-update path.
//! - Service layer remains storage-agnostic.

use crate::classify::Classifier;
use crate::model::task::{validate_description, NewTask, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::service::view::{arrange_tasks, TaskListQuery, TaskStats};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, TaskServiceError>;

/// Errors surfaced to presentation callers.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Input rejected before any I/O.
    Validation(TaskValidationError),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Task service facade over a classifier and a repository.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    classifier: Classifier,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R, classifier: Classifier) -> Self {
        Self { repo, classifier }
    }

    /// Classifies and stores one new task.
    ///
    /// # Contract
    /// - Blank/whitespace-only input returns `Validation` with no side effects.
    /// - Classification failures never fail this call; the fallback pair is
    ///   stored instead.
    /// - Returns the stored row including its id and `created_at`.
    pub fn add_task(&self, description: &str) -> ServiceResult<Task> {
        let started_at = Instant::now();
        if let Err(err) = validate_description(description) {
            warn!("event=task_add module=service status=rejected reason=blank_description");
            return Err(err.into());
        }

        let classification = self.classifier.classify(description);
        let new_task = NewTask {
            description: description.to_string(),
            category: classification.category,
            priority: classification.priority,
        };
        let task = self.repo.insert_task(&new_task)?;

        info!(
            "event=task_add module=service status=ok task_id={} category={} priority={} duration_ms={}",
            task.id,
            task.category,
            task.priority,
            started_at.elapsed().as_millis()
        );
        Ok(task)
    }

    /// Flips `done` for one task and returns the updated row.
    pub fn toggle(&self, id: TaskId) -> ServiceResult<Task> {
        let mut task = self
            .repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        task.done = !task.done;
        self.repo.set_done(id, task.done)?;

        info!(
            "event=task_toggle module=service status=ok task_id={} done={}",
            id, task.done
        );
        Ok(task)
    }

    /// Writes an explicit completion state.
    pub fn set_done(&self, id: TaskId, done: bool) -> ServiceResult<()> {
        self.repo.set_done(id, done)?;
        info!("event=task_set_done module=service status=ok task_id={id} done={done}");
        Ok(())
    }

    /// Hard-deletes one task.
    pub fn remove(&self, id: TaskId) -> ServiceResult<()> {
        self.repo.delete_task(id)?;
        info!("event=task_remove module=service status=ok task_id={id}");
        Ok(())
    }

    /// Every task, newest first, without filtering.
    pub fn list_all(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.list_tasks()?)
    }

    /// Filtered and sorted view over all tasks.
    pub fn list(&self, query: &TaskListQuery) -> ServiceResult<Vec<Task>> {
        Ok(arrange_tasks(self.repo.list_tasks()?, query))
    }

    /// Completion summary over all tasks, completed ones included.
    pub fn stats(&self) -> ServiceResult<TaskStats> {
        Ok(TaskStats::from_tasks(&self.repo.list_tasks()?))
    }
}
