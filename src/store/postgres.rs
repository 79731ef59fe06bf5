//! PostgreSQL card store
//!
//! Cards live in a single JSONB table; the store is the only component that
//! talks SQL. The pool is created once at startup and shared by every
//! request for the life of the process.

use crate::config::StoreConfig;
use crate::error::AppError;
use crate::models::Card;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

const CREATE_CARDS_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS cards (id UUID PRIMARY KEY, body JSONB NOT NULL)";

/// PostgreSQL-backed card store
pub struct PgCardStore {
    pool: Pool,
}

impl PgCardStore {
    /// Build the pool from DATABASE_URL, verify connectivity and make sure
    /// the cards table exists. Must succeed before routes serve traffic.
    pub async fn connect(store: &StoreConfig) -> anyhow::Result<Self> {
        let database_url = store
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL not set in environment or .env file"))?;

        let parsed = url::Url::parse(database_url)
            .map_err(|e| anyhow::anyhow!("Failed to parse DATABASE_URL: {}", e))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("No host in DATABASE_URL"))?
            .to_string();
        let user = parsed.username().to_string();
        if user.is_empty() {
            return Err(anyhow::anyhow!("No user in DATABASE_URL"));
        }
        let database = parsed.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(anyhow::anyhow!("No database name in DATABASE_URL"));
        }

        let mut cfg = Config::new();
        cfg.host = Some(host.clone());
        cfg.port = Some(parsed.port().unwrap_or(5432));
        cfg.user = Some(user);
        cfg.password = parsed.password().map(|p| p.to_string());
        cfg.dbname = Some(database);
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(store.max_pool_size));

        // Managed providers (Neon, Render) require TLS
        let use_tls = host.contains("neon.tech") || database_url.contains("sslmode=require");

        let pool = if use_tls {
            let certs = rustls_native_certs::load_native_certs();
            let mut root_store = rustls::RootCertStore::empty();
            for cert in certs.certs {
                root_store.add(cert).ok();
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
            cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), tls)
                .map_err(|e| anyhow::anyhow!("Failed to create TLS pool: {}", e))?
        } else {
            cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), tokio_postgres::NoTls)
                .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))?
        };

        let client = pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get pool connection: {}", e))?;
        client
            .execute(CREATE_CARDS_TABLE, &[])
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize cards table: {}", e))?;

        info!("Card store connected (TLS: {})", use_tls);
        Ok(Self { pool })
    }

    pub async fn create(&self, body: Map<String, Value>) -> Result<Card, AppError> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                "INSERT INTO cards (id, body) VALUES ($1, $2) RETURNING id, body",
                &[&id, &Value::Object(body)],
            )
            .await?;
        Ok(row_to_card(row.get(0), row.get(1)))
    }

    pub async fn find_all(&self) -> Result<Vec<Card>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query("SELECT id, body FROM cards", &[]).await?;
        Ok(rows
            .iter()
            .map(|row| row_to_card(row.get(0), row.get(1)))
            .collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, body FROM cards WHERE id = $1", &[&id])
            .await?;
        Ok(row.map(|r| row_to_card(r.get(0), r.get(1))))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT 1 FROM cards WHERE id = $1", &[&id])
            .await?;
        Ok(row.is_some())
    }

    /// Atomic merge via jsonb concatenation, returning the post-update body
    pub async fn update_merge(
        &self,
        id: Uuid,
        patch: &Map<String, Value>,
    ) -> Result<Option<Card>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE cards SET body = body || $2 WHERE id = $1 RETURNING id, body",
                &[&id, &Value::Object(patch.clone())],
            )
            .await?;
        Ok(row.map(|r| row_to_card(r.get(0), r.get(1))))
    }

    pub async fn replace(
        &self,
        id: Uuid,
        body: Map<String, Value>,
    ) -> Result<Option<Card>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE cards SET body = $2 WHERE id = $1 RETURNING id, body",
                &[&id, &Value::Object(body)],
            )
            .await?;
        Ok(row.map(|r| row_to_card(r.get(0), r.get(1))))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<Card>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "DELETE FROM cards WHERE id = $1 RETURNING id, body",
                &[&id],
            )
            .await?;
        Ok(row.map(|r| row_to_card(r.get(0), r.get(1))))
    }
}

fn row_to_card(id: Uuid, body: Value) -> Card {
    // bodies are only ever written as objects
    let body = body.as_object().cloned().unwrap_or_default();
    Card::new(id, body)
}
