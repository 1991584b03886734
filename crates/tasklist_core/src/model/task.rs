//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record and its closed enumerations.
//! - Provide the text mapping shared by storage, prompts and classifier parsing.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused while the row exists.
//! - `category` and `priority` are always members of their enumerations.
//! - `created_at` is store-assigned epoch milliseconds and never changes.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned integer identifier.
pub type TaskId = i64;

/// Life area a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Study,
    Personal,
    Health,
}

impl Category {
    /// All categories in declared order.
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Study,
        Category::Personal,
        Category::Health,
    ];

    /// Category used when classification is inconclusive.
    pub const FALLBACK: Category = Category::Personal;

    /// Canonical text form, used for storage and prompts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Study => "Study",
            Self::Personal => "Personal",
            Self::Health => "Health",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a task. Declared from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// All priorities from most to least urgent.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Priority used when classification is inconclusive.
    pub const FALLBACK: Priority = Priority::Medium;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(value))
    }

    /// Sort rank where `High` is smallest.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors raised before a task reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Description is empty or whitespace only.
    BlankDescription,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankDescription => write!(f, "task description cannot be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Insert payload: everything about a task that is known before storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub description: String,
    pub category: Category,
    pub priority: Priority,
}

impl NewTask {
    /// Builds an insert payload after checking the description is not blank.
    pub fn new(
        description: impl Into<String>,
        category: Category,
        priority: Priority,
    ) -> Result<Self, TaskValidationError> {
        let description = description.into();
        validate_description(&description)?;
        Ok(Self {
            description,
            category,
            priority,
        })
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub done: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Rejects empty and whitespace-only descriptions.
pub fn validate_description(description: &str) -> Result<(), TaskValidationError> {
    if description.trim().is_empty() {
        return Err(TaskValidationError::BlankDescription);
    }
    Ok(())
}
