//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use gatehouse_core::auth::OidcProvider;
use gatehouse_core::identity::{AccountLink, NewUser, User};
use gatehouse_core::storage::{RepositoryError, Result, UnitOfWork, UserRepository};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<i64, User>,
    accounts: HashMap<(OidcProvider, String), AccountLink>,
    last_user_id: i64,
}

impl Tables {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }
}

/// In-memory storage backend.
///
/// Data is not persisted and will be lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored account links.
    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.user_by_email(email).cloned())
    }

    async fn get_account(
        &self,
        provider: OidcProvider,
        provider_account_id: &str,
    ) -> Result<Option<AccountLink>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .get(&(provider, provider_account_id.to_string()))
            .cloned())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().write_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryUnitOfWork { guard, staged }))
    }
}

/// Unit of work over [`InMemoryUserStore`].
///
/// Other readers and writers wait until it is committed or dropped.
struct InMemoryUnitOfWork {
    guard: OwnedRwLockWriteGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self.staged.user_by_email(email).cloned())
    }

    async fn create_user(&mut self, user: &NewUser) -> Result<User> {
        if self.staged.user_by_email(&user.email).is_some() {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }

        let now = Utc::now();
        self.staged.last_user_id += 1;
        let created = User {
            id: self.staged.last_user_id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender,
            contact_number: user.contact_number.clone(),
            password: user.password.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn upsert_account(&mut self, account: &AccountLink) -> Result<AccountLink> {
        if !self.staged.users.contains_key(&account.user_id) {
            return Err(RepositoryError::InvalidData(format!(
                "account references missing user {}",
                account.user_id
            )));
        }

        let key = (account.provider, account.provider_account_id.clone());
        let stored = match self.staged.accounts.get(&key) {
            Some(existing) => AccountLink {
                tokens: account.tokens.merged_over(&existing.tokens),
                ..existing.clone()
            },
            None => account.clone(),
        };
        self.staged.accounts.insert(key, stored.clone());

        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
