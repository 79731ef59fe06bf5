//! In-memory card store
//!
//! A thread-safe map with the same semantics as the PostgreSQL backend.
//! Used for local development (STORE_BACKEND=memory) and in tests.

use crate::error::AppError;
use crate::models::{merge_body, Card};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryCardStore {
    cards: Arc<RwLock<HashMap<Uuid, Map<String, Value>>>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, body: Map<String, Value>) -> Result<Card, AppError> {
        let mut cards = self.cards.write().await;
        let id = Uuid::new_v4();
        cards.insert(id, body.clone());
        Ok(Card::new(id, body))
    }

    pub async fn find_all(&self) -> Result<Vec<Card>, AppError> {
        let cards = self.cards.read().await;
        Ok(cards
            .iter()
            .map(|(id, body)| Card::new(*id, body.clone()))
            .collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, AppError> {
        let cards = self.cards.read().await;
        Ok(cards.get(&id).map(|body| Card::new(id, body.clone())))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let cards = self.cards.read().await;
        Ok(cards.contains_key(&id))
    }

    pub async fn update_merge(
        &self,
        id: Uuid,
        patch: &Map<String, Value>,
    ) -> Result<Option<Card>, AppError> {
        let mut cards = self.cards.write().await;
        match cards.get_mut(&id) {
            Some(body) => {
                *body = merge_body(body, patch);
                Ok(Some(Card::new(id, body.clone())))
            }
            None => Ok(None),
        }
    }

    pub async fn replace(
        &self,
        id: Uuid,
        body: Map<String, Value>,
    ) -> Result<Option<Card>, AppError> {
        let mut cards = self.cards.write().await;
        match cards.get_mut(&id) {
            Some(stored) => {
                *stored = body.clone();
                Ok(Some(Card::new(id, body)))
            }
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<Card>, AppError> {
        let mut cards = self.cards.write().await;
        Ok(cards.remove(&id).map(|body| Card::new(id, body)))
    }

    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.cards.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let store = MemoryCardStore::new();
        let created = store.create(obj(json!({"title": "Ace"}))).await.unwrap();
        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.body["title"], json!("Ace"));
    }

    #[tokio::test]
    async fn find_by_unknown_id_is_none() {
        let store = MemoryCardStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_keeps_untouched_fields() {
        let store = MemoryCardStore::new();
        let created = store
            .create(obj(json!({"title": "Ace", "suit": "hearts"})))
            .await
            .unwrap();

        let updated = store
            .update_merge(created.id, &obj(json!({"title": "King"})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.body["title"], json!("King"));
        assert_eq!(updated.body["suit"], json!("hearts"));
    }

    #[tokio::test]
    async fn replace_drops_residual_fields() {
        let store = MemoryCardStore::new();
        let created = store
            .create(obj(json!({"title": "Ace", "suit": "hearts"})))
            .await
            .unwrap();

        let replaced = store
            .replace(created.id, obj(json!({"rank": 1})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(Value::Object(replaced.body.clone()), json!({"rank": 1}));
        assert!(replaced.body.get("suit").is_none());
    }

    #[tokio::test]
    async fn replace_missing_id_is_none_and_creates_nothing() {
        let store = MemoryCardStore::new();
        let outcome = store.replace(Uuid::new_v4(), obj(json!({"x": 1}))).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn delete_returns_last_state_and_removes() {
        let store = MemoryCardStore::new();
        let created = store.create(obj(json!({"title": "Ace"}))).await.unwrap();

        let deleted = store.delete(created.id).await.unwrap().unwrap();
        assert_eq!(deleted.body["title"], json!("Ace"));
        assert!(store.find_by_id(created.id).await.unwrap().is_none());

        // deleting again leaves the store unchanged
        assert!(store.delete(created.id).await.unwrap().is_none());
        assert_eq!(store.count().await, 0);
    }
}
