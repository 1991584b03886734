//! Category/priority classification over a text-generation capability.
//!
//! # Responsibility
//! - Render the classification prompt for one task description.
//! - Pull the first balanced JSON object out of free-form model output.
//! - Resolve `category`/`priority` with per-field defaults.
//!
//! # Invariants
//! - `classify` never fails; every error path yields `Classification::FALLBACK`.
//! - Returned values are always members of their enumerations.
//! - One generation call per `classify`; no retry, no caching.

use super::gemini::GeminiGenerator;
use super::generator::{GenerationError, TextGenerator};
use crate::config::ClassifierConfig;
use crate::model::task::{Category, Priority};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Resolved `(category, priority)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub priority: Priority,
}

impl Classification {
    /// Pair used whenever classification cannot complete.
    pub const FALLBACK: Classification = Classification {
        category: Category::FALLBACK,
        priority: Priority::FALLBACK,
    };
}

/// Reasons a classification attempt fell back. Never crosses `classify`.
#[derive(Debug)]
pub enum ClassificationError {
    /// No generation capability configured.
    NoGenerator,
    Generation(GenerationError),
    /// Response had no balanced `{...}` block.
    NoJsonObject,
    /// The extracted block was not valid JSON.
    Parse(serde_json::Error),
}

impl ClassificationError {
    /// Stable code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoGenerator => "no_generator",
            Self::Generation(_) => "generation_failed",
            Self::NoJsonObject => "no_json_object",
            Self::Parse(_) => "json_parse_failed",
        }
    }
}

impl Display for ClassificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoGenerator => write!(f, "no text generator configured"),
            Self::Generation(err) => write!(f, "generation failed: {err}"),
            Self::NoJsonObject => write!(f, "no JSON object found in response"),
            Self::Parse(err) => write!(f, "invalid JSON in response: {err}"),
        }
    }
}

impl Error for ClassificationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Generation(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::NoGenerator | Self::NoJsonObject => None,
        }
    }
}

impl From<GenerationError> for ClassificationError {
    fn from(value: GenerationError) -> Self {
        Self::Generation(value)
    }
}

/// Prompt-driven task classifier.
pub struct Classifier {
    generator: Option<Box<dyn TextGenerator>>,
}

impl Classifier {
    pub fn new(generator: impl TextGenerator + 'static) -> Self {
        Self {
            generator: Some(Box::new(generator)),
        }
    }

    /// Classifier that always answers `Classification::FALLBACK`.
    pub fn fallback_only() -> Self {
        Self { generator: None }
    }

    /// Builds a Gemini-backed classifier, or a fallback-only one when no API
    /// key is configured or the HTTP client cannot be built.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        match GeminiGenerator::from_config(config) {
            Ok(Some(generator)) => {
                info!(
                    "event=classifier_init module=classifier status=ok provider=gemini model={}",
                    config.model
                );
                Self::new(generator)
            }
            Ok(None) => {
                warn!(
                    "event=classifier_init module=classifier status=degraded reason=missing_api_key"
                );
                Self::fallback_only()
            }
            Err(err) => {
                warn!(
                    "event=classifier_init module=classifier status=degraded reason=client_build_failed error={}",
                    err
                );
                Self::fallback_only()
            }
        }
    }

    pub fn is_fallback_only(&self) -> bool {
        self.generator.is_none()
    }

    /// Classifies `description`, falling back instead of failing.
    pub fn classify(&self, description: &str) -> Classification {
        let started_at = Instant::now();
        match self.try_classify(description) {
            Ok(classification) => {
                info!(
                    "event=classify module=classifier status=ok category={} priority={} duration_ms={}",
                    classification.category,
                    classification.priority,
                    started_at.elapsed().as_millis()
                );
                classification
            }
            Err(err) => {
                warn!(
                    "event=classify module=classifier status=fallback reason={} duration_ms={} error={}",
                    err.code(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Classification::FALLBACK
            }
        }
    }

    /// Fallible classification, exposing why a fallback would be used.
    pub fn try_classify(&self, description: &str) -> Result<Classification, ClassificationError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(ClassificationError::NoGenerator)?;
        let raw = generator.generate(&build_prompt(description))?;
        parse_classification(&raw)
    }
}

/// Renders the classification prompt for one description.
pub fn build_prompt(description: &str) -> String {
    let categories = join_names(Category::ALL.iter().map(|c| c.as_str()));
    let priorities = join_names(Priority::ALL.iter().map(|p| p.as_str()));
    let task = WHITESPACE_RE.replace_all(description.trim(), " ");

    format!(
        "Categorize the following task into a category ({categories}) and \
assign a priority ({priorities}).\n\
Return the response as only valid JSON, strictly following this format:\n\
{{\n    \"category\": \"{category_choices}\",\n    \"priority\": \"{priority_choices}\"\n}}\n\
Task: \"{task}\"\n",
        category_choices = categories.replace(", ", "/"),
        priority_choices = priorities.replace(", ", "/"),
    )
}

/// Parses raw model output into a classification.
///
/// Missing keys and unrecognized values resolve to the per-field default.
pub fn parse_classification(raw: &str) -> Result<Classification, ClassificationError> {
    let object = extract_json_object(raw).ok_or(ClassificationError::NoJsonObject)?;
    let value: Value = serde_json::from_str(object).map_err(ClassificationError::Parse)?;

    let category = resolve_field(&value, "category", Category::parse, Category::FALLBACK);
    let priority = resolve_field(&value, "priority", Priority::parse, Priority::FALLBACK);

    Ok(Classification { category, priority })
}

/// Returns the first balanced `{...}` block in `text`.
///
/// Scans once from the first `{`; unclosed braces are skipped and braces
/// inside JSON string literals are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let mut open_starts: Vec<usize> = Vec::new();
    let mut earliest: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[first..].char_indices() {
        let index = first + offset;
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => open_starts.push(index),
            '}' => {
                let Some(start) = open_starts.pop() else {
                    continue;
                };
                let end = index + ch.len_utf8();
                if open_starts.is_empty() {
                    return Some(&text[start..end]);
                }
                if earliest.map_or(true, |(best, _)| start < best) {
                    earliest = Some((start, end));
                }
            }
            _ => {}
        }
    }

    earliest.map(|(start, end)| &text[start..end])
}

fn resolve_field<T: Copy>(
    value: &Value,
    key: &'static str,
    parse: fn(&str) -> Option<T>,
    default: T,
) -> T {
    let Some(field) = value.get(key) else {
        return default;
    };

    match field.as_str().and_then(parse) {
        Some(resolved) => resolved,
        None => {
            warn!("event=classify_clamp module=classifier status=clamped field={key}");
            default
        }
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
