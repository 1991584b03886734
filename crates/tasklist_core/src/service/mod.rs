//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate classifier and repository calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod task_service;
pub mod view;
