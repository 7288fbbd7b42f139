//! SQLite repository implementation.
//!
//! Implements `UserRepository` and `UnitOfWork` from `gatehouse_core::storage`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use gatehouse_core::auth::OidcProvider;
use gatehouse_core::identity::{AccountLink, NewUser, User};
use gatehouse_core::storage::{RepositoryError, Result, UnitOfWork, UserRepository};

use super::conversions::{format_datetime, row_to_account, row_to_user, AccountRow, UserRow};
use super::error::map_sqlx_error;
use super::schema;

/// SQLite-backed user store.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Creates a new store on an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `users` and `accounts` tables if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(schema::CREATE_TABLES)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteUserStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(schema::SELECT_USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", &id.to_string()))?
            .map(row_to_user)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(schema::SELECT_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "User", email))?
            .map(row_to_user)
            .transpose()
    }

    async fn get_account(
        &self,
        provider: OidcProvider,
        provider_account_id: &str,
    ) -> Result<Option<AccountLink>> {
        sqlx::query_as::<_, AccountRow>(schema::SELECT_ACCOUNT)
            .bind(provider.to_string())
            .bind(provider_account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Account", provider_account_id))?
            .map(row_to_account)
            .transpose()
    }

    /// Opens an `IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front; a deferred transaction that reads
    /// first fails with `SQLITE_BUSY` when another writer got there in
    /// between, instead of waiting on the busy timeout.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

/// Unit of work over one pool transaction.
struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(schema::SELECT_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error(e, "User", email))?
            .map(row_to_user)
            .transpose()
    }

    async fn create_user(&mut self, user: &NewUser) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(schema::INSERT_USER)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.gender.as_str())
            .bind(&user.contact_number)
            .bind(&user.password)
            .bind(format_datetime(&now))
            .bind(format_datetime(&now))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error(e, "User", &user.email))?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender,
            contact_number: user.contact_number.clone(),
            password: user.password.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn upsert_account(&mut self, account: &AccountLink) -> Result<AccountLink> {
        let tokens = &account.tokens;

        let row = sqlx::query_as::<_, AccountRow>(schema::UPSERT_ACCOUNT)
            .bind(account.user_id)
            .bind(&account.account_type)
            .bind(account.provider.to_string())
            .bind(&account.provider_account_id)
            .bind(&tokens.access_token)
            .bind(&tokens.refresh_token)
            .bind(tokens.expires_at)
            .bind(&tokens.token_type)
            .bind(&tokens.scope)
            .bind(&tokens.id_token)
            .bind(&tokens.session_state)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error(e, "Account", &account.provider_account_id))?;

        row_to_account(row)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}
