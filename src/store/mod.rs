//! Card store backends
//!
//! The store owns id assignment and the document-level operations the
//! handlers delegate to: create, find, merge-update, replace, delete. Two
//! backends exist: PostgreSQL (JSONB table, the production path) and an
//! in-process map for development and tests.

mod memory;
mod postgres;

pub use memory::MemoryCardStore;
pub use postgres::PgCardStore;

use crate::error::AppError;
use crate::models::Card;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Backend-dispatching card store
pub enum CardStore {
    Postgres(PgCardStore),
    Memory(MemoryCardStore),
}

impl CardStore {
    /// Insert a new card, assigning its id
    pub async fn create(&self, body: Map<String, Value>) -> Result<Card, AppError> {
        match self {
            CardStore::Postgres(s) => s.create(body).await,
            CardStore::Memory(s) => s.create(body).await,
        }
    }

    /// Fetch every card, unfiltered
    pub async fn find_all(&self) -> Result<Vec<Card>, AppError> {
        match self {
            CardStore::Postgres(s) => s.find_all().await,
            CardStore::Memory(s) => s.find_all().await,
        }
    }

    /// Fetch one card by id; Ok(None) when no record matches
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, AppError> {
        match self {
            CardStore::Postgres(s) => s.find_by_id(id).await,
            CardStore::Memory(s) => s.find_by_id(id).await,
        }
    }

    /// Whether a card with this id exists
    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        match self {
            CardStore::Postgres(s) => s.exists(id).await,
            CardStore::Memory(s) => s.exists(id).await,
        }
    }

    /// Merge the provided fields onto the stored body, returning the
    /// post-update state; Ok(None) when no record matches
    pub async fn update_merge(
        &self,
        id: Uuid,
        patch: &Map<String, Value>,
    ) -> Result<Option<Card>, AppError> {
        match self {
            CardStore::Postgres(s) => s.update_merge(id, patch).await,
            CardStore::Memory(s) => s.update_merge(id, patch).await,
        }
    }

    /// Overwrite the stored body entirely; fields absent from `body` are
    /// gone afterwards. Ok(None) when no record matches.
    pub async fn replace(
        &self,
        id: Uuid,
        body: Map<String, Value>,
    ) -> Result<Option<Card>, AppError> {
        match self {
            CardStore::Postgres(s) => s.replace(id, body).await,
            CardStore::Memory(s) => s.replace(id, body).await,
        }
    }

    /// Remove a card, returning its last known state; Ok(None) when no
    /// record matches
    pub async fn delete(&self, id: Uuid) -> Result<Option<Card>, AppError> {
        match self {
            CardStore::Postgres(s) => s.delete(id).await,
            CardStore::Memory(s) => s.delete(id).await,
        }
    }
}
