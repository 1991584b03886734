//! Domain model for tracked tasks.
//!
//! # Responsibility
//! - Define the canonical task record and its enumerations.
//!
//! # Invariants
//! - Every task is identified by a store-assigned `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
