//! Suggestion client with a rate-limit fallback chain.

use crate::suggest::config::{ConfigError, SuggestionConfig, DEFAULT_MODEL_CHAIN};
use crate::suggest::gemini::GeminiModel;
use crate::suggest::{LanguageModel, ModelOutcome, SuggestError, SuggestResult};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const MAX_RESPONSE_EXCERPT_CHARS: usize = 100;

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\n?").expect("valid code fence regex"));

/// Proposes existing category names for a dish via a language model.
pub struct SuggestionClient<M: LanguageModel> {
    model: M,
    chain: Vec<String>,
}

impl SuggestionClient<GeminiModel> {
    /// Gemini-backed client using the config's model chain.
    pub fn from_config(config: &SuggestionConfig) -> Result<Self, ConfigError> {
        let model = GeminiModel::new(config)?;
        Ok(Self {
            model,
            chain: config.models.clone(),
        })
    }
}

impl<M: LanguageModel> SuggestionClient<M> {
    /// Client over `model` with the default fallback chain.
    pub fn new(model: M) -> Self {
        Self {
            model,
            chain: DEFAULT_MODEL_CHAIN.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Client with an explicit chain. The chain must not be empty.
    pub fn with_chain(model: M, chain: Vec<String>) -> SuggestResult<Self> {
        if chain.is_empty() || chain.iter().any(|m| m.trim().is_empty()) {
            return Err(SuggestError::Validation(
                "model chain must be non-empty with non-blank ids".to_string(),
            ));
        }
        Ok(Self { model, chain })
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Suggests categories for `dish_name`, chosen from `existing_category_names`.
    ///
    /// Returns an empty list without calling the model when the name is blank.
    ///
    /// # Errors
    /// - `Validation` when `existing_category_names` is empty.
    /// - `Provider` on the first non-rate-limit failure.
    /// - `RateLimited` when every model in the chain is rate limited.
    /// - `Parse` when the response is not a JSON array.
    pub fn suggest_categories(
        &self,
        dish_name: &str,
        existing_category_names: &[String],
    ) -> SuggestResult<Vec<String>> {
        if dish_name.trim().is_empty() {
            return Ok(Vec::new());
        }
        if existing_category_names.is_empty() {
            return Err(SuggestError::Validation(
                "no categories exist yet; create categories first".to_string(),
            ));
        }

        let prompt = build_prompt(dish_name, existing_category_names);
        let last_index = self.chain.len().saturating_sub(1);

        for (index, model) in self.chain.iter().enumerate() {
            match self.model.generate(model, &prompt) {
                ModelOutcome::Success(text) => {
                    let suggestions = parse_suggestions(&text, existing_category_names)?;
                    info!(
                        "event=suggest module=suggest status=ok model={model} attempt={} suggested={}",
                        index + 1,
                        suggestions.len()
                    );
                    return Ok(suggestions);
                }
                ModelOutcome::RateLimited(_) if index < last_index => {
                    warn!(
                        "event=suggest module=suggest status=fallback model={model} next={}",
                        self.chain[index + 1]
                    );
                }
                ModelOutcome::RateLimited(reason) => {
                    warn!("event=suggest module=suggest status=error model={model} kind=rate_limited");
                    return Err(SuggestError::RateLimited {
                        model: model.clone(),
                        reason,
                    });
                }
                ModelOutcome::Fatal(reason) => {
                    warn!("event=suggest module=suggest status=error model={model} kind=provider");
                    return Err(SuggestError::Provider {
                        model: model.clone(),
                        reason,
                    });
                }
            }
        }

        Err(SuggestError::Validation("model chain is empty".to_string()))
    }
}

/// Replaces quotes, backslashes and line breaks with spaces, then trims.
pub fn sanitize_dish_name(dish_name: &str) -> String {
    dish_name
        .replace(['"', '\\', '\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Prompt asking for a bare JSON array of names from `category_names`.
pub fn build_prompt(dish_name: &str, category_names: &[String]) -> String {
    format!(
        "Given the dish \"{}\" and the following categories: {}.\n\
         Suggest the most relevant categories for this dish.\n\
         Format your response as a JSON array of strings, e.g., [\"Category1\", \"Category2\"].\n\
         Use only category names from the list above.\n\
         Do not include any other text or explanation outside of the JSON array.",
        sanitize_dish_name(dish_name),
        category_names.join(", ")
    )
}

/// Parses a model response into names present in `existing_category_names`.
///
/// Code fences are stripped first. Non-string items and unknown names are
/// dropped, duplicates keep their first occurrence.
pub fn parse_suggestions(
    raw: &str,
    existing_category_names: &[String],
) -> SuggestResult<Vec<String>> {
    let trimmed = raw.trim();
    let cleaned = if trimmed.starts_with("```") {
        CODE_FENCE_RE.replace_all(trimmed, "").trim().to_string()
    } else {
        trimmed.to_string()
    };

    let parse_error = || SuggestError::Parse {
        excerpt: trimmed.chars().take(MAX_RESPONSE_EXCERPT_CHARS).collect(),
    };
    let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|_| parse_error())?;
    let items = value.as_array().ok_or_else(parse_error)?;

    let mut seen = HashSet::new();
    Ok(items
        .iter()
        .filter_map(|item| item.as_str())
        .filter(|name| existing_category_names.iter().any(|existing| existing == name))
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect())
}
