//! AI-assisted category suggestions.
//!
//! # Responsibility
//! - Ask a language model which catalog categories fit a dish name.
//! - Walk a fixed fallback chain of models on rate limiting.
//!
//! # Invariants
//! - Suggestions are always a subset of the names offered to the model.
//! - The fallback loop is bounded by the chain length.
//! - Dish names, prompts and responses are never logged.

pub mod client;
pub mod config;
pub mod gemini;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use client::SuggestionClient;
pub use config::{ConfigError, SuggestionConfig, DEFAULT_MODEL_CHAIN};
pub use gemini::GeminiModel;

pub type SuggestResult<T> = Result<T, SuggestError>;

/// Result of one provider call, classified for the fallback loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    /// Raw model text.
    Success(String),
    /// Provider throttled this model; the next model may be tried.
    RateLimited(String),
    /// Any other failure; the chain stops.
    Fatal(String),
}

/// Text-in/text-out language model addressed by model identifier.
pub trait LanguageModel {
    fn generate(&self, model: &str, prompt: &str) -> ModelOutcome;
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn generate(&self, model: &str, prompt: &str) -> ModelOutcome {
        (**self).generate(model, prompt)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn generate(&self, model: &str, prompt: &str) -> ModelOutcome {
        (**self).generate(model, prompt)
    }
}

/// Suggestion error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestError {
    /// Precondition violated (e.g. empty category list).
    Validation(String),
    /// The last model of the chain was rate limited too.
    RateLimited { model: String, reason: String },
    /// Non-rate-limit provider failure.
    Provider { model: String, reason: String },
    /// Response was not a JSON array.
    Parse { excerpt: String },
}

impl Display for SuggestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid suggestion request: {message}"),
            Self::RateLimited { model, reason } => {
                write!(f, "all models rate limited (last `{model}`): {reason}")
            }
            Self::Provider { model, reason } => {
                write!(f, "model `{model}` failed: {reason}")
            }
            Self::Parse { excerpt } => {
                write!(f, "could not parse model response as a JSON array: {excerpt}")
            }
        }
    }
}

impl Error for SuggestError {}
