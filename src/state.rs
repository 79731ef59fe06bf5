//! Application state management
//!
//! Contains shared state accessible across all handlers. The card store and
//! the student file are the only long-lived resources; there is no other
//! cross-request mutable state.

use crate::config::SchemaConfig;
use crate::store::CardStore;
use crate::students::StudentFile;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Card store backend (established once at startup)
    pub cards: CardStore,

    /// CSV-backed student file sidecar
    pub students: StudentFile,

    /// Optional card body schema (empty means schema-less pass-through)
    pub schema: SchemaConfig,
}

impl AppState {
    pub fn new(cards: CardStore, students: StudentFile, schema: SchemaConfig) -> Self {
        Self {
            cards,
            students,
            schema,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
