//! Read-side projections over the full task list.
//!
//! Pure functions only; callers fetch the list and hand it in.

use crate::model::task::{Category, Task};
use serde::Serialize;

/// Supported list orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// `created_at` descending.
    #[default]
    Newest,
    /// High, then Medium, then Low.
    Priority,
    /// Category name, alphabetical.
    Category,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" | "newest first" => Some(Self::Newest),
            "priority" => Some(Self::Priority),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// Filter and sort options for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskListQuery {
    pub show_completed: bool,
    pub sort: SortKey,
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            show_completed: true,
            sort: SortKey::Newest,
        }
    }
}

/// Applies `query` to `tasks`.
///
/// Sorts are stable: tasks with equal keys keep their incoming order.
pub fn arrange_tasks(mut tasks: Vec<Task>, query: &TaskListQuery) -> Vec<Task> {
    if !query.show_completed {
        tasks.retain(|task| !task.done);
    }

    match query.sort {
        SortKey::Newest => {
            tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
        }
        SortKey::Priority => tasks.sort_by_key(|task| task.priority.rank()),
        SortKey::Category => tasks.sort_by_key(|task| task.category.as_str()),
    }

    tasks
}

/// Completion summary for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percent in `0.0..=100.0`; `0.0` for an empty list.
    pub completion_rate: f64,
    /// Count per category in declared order, zero counts included.
    pub by_category: Vec<(Category, usize)>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.done).count();
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        let by_category = Category::ALL
            .into_iter()
            .map(|category| {
                let count = tasks.iter().filter(|task| task.category == category).count();
                (category, count)
            })
            .collect();

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            by_category,
        }
    }
}
