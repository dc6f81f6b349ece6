//! Dish model and rich-text description handling.
//!
//! # Responsibility
//! - Define the catalog dish record.
//! - Define the rich-text delta schema stored in `description`.
//! - Flatten descriptions to plain text for keyword classification.
//!
//! # Invariants
//! - Description flattening never fails: anything that is not a delta
//!   document is treated as plain text.
//! - Embed inserts (images, formulas, ...) contribute no text.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable dish identifier.
pub type DishId = Uuid;

/// Catalog dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    /// Raw description as stored: usually a serialized [`RichTextDelta`],
    /// but legacy rows may hold plain text.
    pub description: Option<String>,
}

impl Dish {
    /// Creates a dish with a generated id and no description.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: DishId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Plain text of the description, or an empty string when absent.
    pub fn description_text(&self) -> String {
        self.description
            .as_deref()
            .map(plain_text_from_description)
            .unwrap_or_default()
    }
}

/// Rich-text document: an ordered list of insert operations.
///
/// Serialized as `{"ops": [{"insert": "text"}, {"insert": {"image": "..."}}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextDelta {
    pub ops: Vec<DeltaOp>,
}

/// One delta operation. Only inserts carry content; other op kinds
/// deserialize with `insert = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaOp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<DeltaInsert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

/// Insert payload: text, or an embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaInsert {
    Text(String),
    Embed(serde_json::Value),
}

impl RichTextDelta {
    /// Wraps plain text as a single-insert document.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            ops: vec![DeltaOp {
                insert: Some(DeltaInsert::Text(format!("{text}\n"))),
                attributes: None,
            }],
        }
    }

    /// Parses a stored description; `None` when it is not a delta document.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Text inserts joined by single spaces.
    pub fn plain_text(&self) -> String {
        self.text_inserts().collect::<Vec<_>>().join(" ")
    }

    /// True when the document has no embeds and only whitespace text.
    pub fn is_blank(&self) -> bool {
        self.ops.iter().all(|op| match &op.insert {
            Some(DeltaInsert::Text(text)) => text.trim().is_empty(),
            Some(DeltaInsert::Embed(_)) => false,
            None => true,
        })
    }

    fn text_inserts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match &op.insert {
            Some(DeltaInsert::Text(text)) => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Flattens a stored description to plain text.
///
/// Delta documents yield their text inserts joined by spaces. Any other
/// value (plain text, malformed JSON, JSON without `ops`) is returned as is.
pub fn plain_text_from_description(raw: &str) -> String {
    match RichTextDelta::parse(raw) {
        Some(delta) => delta.plain_text(),
        None => raw.to_string(),
    }
}

/// Maps blank descriptions (empty text or a blank delta) to `None`.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    let raw = description?;
    if raw.trim().is_empty() {
        return None;
    }
    match RichTextDelta::parse(&raw) {
        Some(delta) if delta.is_blank() => None,
        _ => Some(raw),
    }
}
