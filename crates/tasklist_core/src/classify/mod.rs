//! Task classification pipeline.
//!
//! # Responsibility
//! - Turn a free-text description into a `(category, priority)` pair.
//! - Keep the generation provider behind the `TextGenerator` seam.

pub mod classifier;
pub mod gemini;
pub mod generator;

pub use classifier::{Classification, ClassificationError, Classifier};
pub use gemini::GeminiGenerator;
pub use generator::{GenerationError, TextGenerator};
