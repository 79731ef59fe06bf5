//! Card record model and body validation

use crate::config::SchemaConfig;
use crate::error::{validation_error, AppError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A card document: a store-assigned id plus a caller-supplied body.
///
/// The body is intentionally loose; callers may store whatever JSON object
/// they like unless a schema is configured (CARD_REQUIRED_FIELDS).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: Uuid,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Card {
    pub fn new(id: Uuid, body: Map<String, Value>) -> Self {
        Self { id, body }
    }
}

/// Check a card body against the configured schema.
///
/// With no required fields configured this accepts any object, matching the
/// source service's pass-through behavior. Violations are client errors (400),
/// distinct from store faults (500).
pub fn validate_card_body(schema: &SchemaConfig, body: &Map<String, Value>) -> Result<(), AppError> {
    let missing: Vec<&str> = schema
        .required_fields
        .iter()
        .map(String::as_str)
        .filter(|f| !body.get(*f).map(|v| !v.is_null()).unwrap_or(false))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(validation_error(format!(
            "Missing required card fields: {}",
            missing.join(", ")
        )))
    }
}

/// Merge a partial payload onto an existing body: provided fields overwrite,
/// everything else is left untouched.
pub fn merge_body(existing: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = existing.clone();
    for (k, v) in patch {
        merged.insert(k.clone(), v.clone());
    }
    merged
}
