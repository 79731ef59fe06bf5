//! Card CRUD route handlers
//!
//! Every handler follows the same policy: parse the id (malformed → 400),
//! delegate to the store, map a missing record to 404 and any store fault to
//! 500 via `AppError`. Body validation against the configured schema (when
//! one is set) happens here, before the store is touched.

use crate::error::{not_found_error, validation_error, ApiResult, AppError};
use crate::models::{merge_body, validate_card_body, Card, SuccessResponse};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

const CARD_NOT_FOUND: &str = "Card not found";

/// Parse a path id, mapping syntax errors to a 400
fn parse_card_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|e| AppError::InvalidId(format!("'{}': {}", raw, e)))
}

/// Require the request body to be a JSON object
fn require_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(validation_error(format!(
            "Card body must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Create a new card from an arbitrary JSON object body
pub async fn create_card(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<Card>>)> {
    let body = require_object(body)?;
    validate_card_body(&state.schema, &body)?;

    let card = state.cards.create(body).await?;
    info!("Card {} created", card.id);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Card created successfully", card)),
    ))
}

/// Fetch every card, unfiltered
pub async fn get_all_cards(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<Vec<Card>>>> {
    let cards = state.cards.find_all().await?;
    debug!("Fetched {} cards", cards.len());

    Ok(Json(SuccessResponse::with_data(
        "Cards fetched successfully",
        cards,
    )))
}

/// Fetch one card by id
pub async fn get_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse<Card>>> {
    let id = parse_card_id(&id)?;

    let card = state
        .cards
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error(CARD_NOT_FOUND))?;

    Ok(Json(SuccessResponse::with_data("Card found", card)))
}

/// Partial update: merge the provided fields onto the stored card
pub async fn update_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<SuccessResponse<Card>>> {
    let id = parse_card_id(&id)?;
    let patch = require_object(body)?;

    // With a schema configured, the merged result must validate before it is
    // persisted. The read below races a concurrent delete; the merge itself
    // stays a single store call so the response always carries the
    // post-update state.
    if !state.schema.required_fields.is_empty() {
        let current = state
            .cards
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(CARD_NOT_FOUND))?;
        validate_card_body(&state.schema, &merge_body(&current.body, &patch))?;
    }

    let card = state
        .cards
        .update_merge(id, &patch)
        .await?
        .ok_or_else(|| not_found_error(CARD_NOT_FOUND))?;
    info!("Card {} updated (merge)", card.id);

    Ok(Json(SuccessResponse::with_data(
        "Card updated successfully",
        card,
    )))
}

/// Full update: replace the entire card body
///
/// Existence is checked explicitly before the overwrite so the caller can
/// tell "no such card" (404) from "replace failed" (500). The two steps are
/// not atomic against a concurrent delete; that race existed in the source
/// and is accepted.
pub async fn update_card_full(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<SuccessResponse<Card>>> {
    let id = parse_card_id(&id)?;
    let body = require_object(body)?;
    validate_card_body(&state.schema, &body)?;

    if !state.cards.exists(id).await? {
        return Err(not_found_error(CARD_NOT_FOUND));
    }

    let card = state
        .cards
        .replace(id, body)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Replace of card {} affected no record", id)))?;
    info!("Card {} updated (replace)", card.id);

    Ok(Json(SuccessResponse::with_data(
        "Card fully updated successfully",
        card,
    )))
}

/// Delete a card, returning its last known state
pub async fn delete_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse<Card>>> {
    let id = parse_card_id(&id)?;

    let card = state
        .cards
        .delete(id)
        .await?
        .ok_or_else(|| not_found_error(CARD_NOT_FOUND))?;
    info!("Card {} deleted", card.id);

    Ok(Json(SuccessResponse::with_data(
        "Card deleted successfully",
        card,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::state::AppState;
    use crate::store::{CardStore, MemoryCardStore};
    use crate::students::StudentFile;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn test_state(schema: SchemaConfig) -> SharedState {
        Arc::new(AppState::new(
            CardStore::Memory(MemoryCardStore::new()),
            StudentFile::new(std::env::temp_dir().join("cards-test-unused.csv")),
            schema,
        ))
    }

    async fn seed(state: &SharedState, body: Value) -> Card {
        state
            .cards
            .create(body.as_object().unwrap().clone())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_returns_201_with_assigned_id() {
        let state = test_state(SchemaConfig::default());
        let (status, Json(resp)) = create_card(State(state.clone()), Json(json!({"title": "Ace"})))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(resp.success);
        let card = resp.data.unwrap();
        assert_eq!(card.body["title"], json!("Ace"));

        // create-then-read round trip
        let found = state.cards.find_by_id(card.id).await.unwrap().unwrap();
        assert_eq!(found, card);
    }

    #[tokio::test]
    async fn create_rejects_non_object_body() {
        let state = test_state(SchemaConfig::default());
        let err = create_card(State(state), Json(json!([1, 2])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_enforces_configured_schema() {
        let state = test_state(SchemaConfig {
            required_fields: vec!["title".to_string()],
        });
        let err = create_card(State(state), Json(json!({"suit": "hearts"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn get_card_distinguishes_bad_id_from_absent_id() {
        let state = test_state(SchemaConfig::default());

        let err = get_card(State(state.clone()), Path("not-a-uuid".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidId(_)));

        let err = get_card(State(state), Path(Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn patch_merges_and_returns_post_update_state() {
        let state = test_state(SchemaConfig::default());
        let card = seed(&state, json!({"title": "Ace", "suit": "hearts"})).await;

        let Json(resp) = update_card(
            State(state),
            Path(card.id.to_string()),
            Json(json!({"title": "King"})),
        )
        .await
        .unwrap();

        let updated = resp.data.unwrap();
        assert_eq!(updated.body["title"], json!("King"));
        assert_eq!(updated.body["suit"], json!("hearts"));
    }

    #[tokio::test]
    async fn patch_rejects_merge_that_breaks_schema() {
        let state = test_state(SchemaConfig {
            required_fields: vec!["title".to_string()],
        });
        let card = seed(&state, json!({"title": "Ace"})).await;

        let err = update_card(
            State(state),
            Path(card.id.to_string()),
            Json(json!({"title": null})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn put_replaces_whole_body_and_404s_when_absent() {
        let state = test_state(SchemaConfig::default());
        let card = seed(&state, json!({"title": "Ace", "suit": "hearts"})).await;

        let Json(resp) = update_card_full(
            State(state.clone()),
            Path(card.id.to_string()),
            Json(json!({"rank": 1})),
        )
        .await
        .unwrap();
        let replaced = resp.data.unwrap();
        assert_eq!(Value::Object(replaced.body.clone()), json!({"rank": 1}));

        let err = update_card_full(
            State(state.clone()),
            Path(Uuid::new_v4().to_string()),
            Json(json!({"rank": 2})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // the failed replace created nothing
        assert_eq!(state.cards.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_and_reports_last_state() {
        let state = test_state(SchemaConfig::default());
        let card = seed(&state, json!({"title": "Ace"})).await;

        let Json(resp) = delete_card(State(state.clone()), Path(card.id.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().body["title"], json!("Ace"));

        let err = get_card(State(state.clone()), Path(card.id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = delete_card(State(state), Path(card.id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_all_returns_empty_list_without_error() {
        let state = test_state(SchemaConfig::default());
        let Json(resp) = get_all_cards(State(state)).await.unwrap();
        assert!(resp.success);
        assert!(resp.data.unwrap().is_empty());
    }
}
