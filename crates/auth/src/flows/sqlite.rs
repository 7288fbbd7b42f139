//! SQLite auth flow storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::auth::{AuthError, AuthFlowRepository, AuthFlowState, Result};
use sqlx::SqlitePool;

type FlowRow = (String, String, String, Option<String>);

/// SQLite-backed auth flow storage.
#[derive(Debug, Clone)]
pub struct SqliteFlowStore {
    pool: SqlitePool,
}

impl SqliteFlowStore {
    /// Creates a new SQLite flow store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS auth_flows (
                state TEXT PRIMARY KEY,
                pkce_verifier TEXT NOT NULL,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL,
                callback_url TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}

fn row_to_flow((pkce_verifier, provider, created_at, callback_url): FlowRow) -> Result<AuthFlowState> {
    Ok(AuthFlowState {
        pkce_verifier,
        provider: provider
            .parse()
            .map_err(|_| AuthError::Storage(format!("Unknown provider: {}", provider)))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .with_timezone(&Utc),
        callback_url,
    })
}

#[async_trait]
impl AuthFlowRepository for SqliteFlowStore {
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO auth_flows (state, pkce_verifier, provider, created_at, callback_url) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(state)
        .bind(&flow.pkce_verifier)
        .bind(flow.provider.to_string())
        .bind(flow.created_at.to_rfc3339())
        .bind(&flow.callback_url)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        // One statement, so a state can only be taken once
        let row = sqlx::query_as::<_, FlowRow>(
            "DELETE FROM auth_flows WHERE state = ? RETURNING pkce_verifier, provider, created_at, callback_url",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        row.map(row_to_flow).transpose()
    }
}
