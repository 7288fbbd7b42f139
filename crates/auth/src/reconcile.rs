//! Sign-in reconciliation: make sure a provider identity has a local user
//! and a current account link.

use std::sync::Arc;

use gatehouse_core::auth::{ProviderIdentity, SignInPolicy};
use gatehouse_core::identity::{AccountLink, NewUser, User};
use gatehouse_core::storage::UserRepository;

use crate::error::AuthError;

/// Why a sign-in was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The provider asserted no email, so no local user can be resolved.
    MissingEmail,
}

impl DenyReason {
    /// Error code carried to the sign-in page.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingEmail => "AccessDenied",
        }
    }
}

/// Result of reconciling one provider sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Sign-in may proceed. `user` is `None` for pass-through providers.
    Allowed { user: Option<User> },
    Denied(DenyReason),
}

/// Runs the sign-in upsert against the user store.
#[derive(Clone)]
pub struct SignInReconciler {
    users: Arc<dyn UserRepository>,
}

impl SignInReconciler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Reconcile `identity` with local records according to `policy`.
    ///
    /// With `Reconcile`, the user is looked up by email and created when
    /// absent, then the account link is inserted or has its token metadata
    /// refreshed. Both writes share one unit of work: if either fails,
    /// neither is kept.
    ///
    /// # Errors
    ///
    /// Store failures propagate. A missing email is not an error; it yields
    /// `SignInOutcome::Denied` without touching the store.
    pub async fn reconcile(
        &self,
        identity: &ProviderIdentity,
        policy: SignInPolicy,
    ) -> Result<SignInOutcome, AuthError> {
        if policy == SignInPolicy::PassThrough {
            tracing::debug!(
                provider = %identity.provider,
                "Provider is not reconciled, allowing sign-in"
            );
            return Ok(SignInOutcome::Allowed { user: None });
        }

        let Some(email) = identity.email.as_deref().filter(|e| !e.is_empty()) else {
            tracing::warn!(
                provider = %identity.provider,
                "Provider identity has no email, denying sign-in"
            );
            return Ok(SignInOutcome::Denied(DenyReason::MissingEmail));
        };

        let mut uow = self.users.begin().await?;

        let (user, created) = match uow.get_user_by_email(email).await? {
            Some(user) => (user, false),
            None => {
                let new_user = NewUser::from_provider(email, identity.name.as_deref());
                (uow.create_user(&new_user).await?, true)
            }
        };

        uow.upsert_account(&AccountLink::from_identity(identity, user.id))
            .await?;
        uow.commit().await?;

        tracing::info!(
            provider = %identity.provider,
            email = %email,
            user_id = user.id,
            created,
            "Sign-in reconciled"
        );

        Ok(SignInOutcome::Allowed { user: Some(user) })
    }
}


#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use std::time::Duration;

    use super::*;
    use gatehouse_core::auth::OidcProvider;
    use gatehouse_core::identity::TokenSet;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use tempfile::TempDir;
    use tokio::task::JoinSet;

    use crate::storage::SqliteUserStore;

    /// File-backed store with several connections, so writers really contend.
    async fn store(dir: &TempDir) -> (SqliteUserStore, SqlitePool) {
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("gatehouse.db"))
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .unwrap();
        let store = SqliteUserStore::new(pool.clone());
        store.migrate().await.unwrap();
        (store, pool)
    }

    fn identity(sub: &str, email: Option<&str>, access_token: &str) -> ProviderIdentity {
        ProviderIdentity {
            provider: OidcProvider::Google,
            provider_account_id: sub.to_string(),
            email: email.map(String::from),
            name: Some("Ada Lovelace".to_string()),
            image: None,
            tokens: TokenSet {
                access_token: Some(access_token.to_string()),
                ..Default::default()
            },
        }
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn repeated_sign_ins_keep_one_user_and_one_account() {
        let dir = TempDir::new().unwrap();
        let (store, pool) = store(&dir).await;
        let reconciler = SignInReconciler::new(Arc::new(store.clone()));

        for token in ["access-1", "access-2"] {
            let outcome = reconciler
                .reconcile(
                    &identity("sub-ada", Some("ada@example.com"), token),
                    SignInPolicy::Reconcile,
                )
                .await
                .unwrap();
            assert!(matches!(outcome, SignInOutcome::Allowed { user: Some(_) }));
        }

        assert_eq!(count(&pool, "users").await, 1);
        assert_eq!(count(&pool, "accounts").await, 1);

        let user = store
            .get_user_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name.as_deref(), Some("Lovelace"));

        let account = store
            .get_account(OidcProvider::Google, "sub-ada")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.user_id, user.id);
        assert_eq!(account.tokens.access_token.as_deref(), Some("access-2"));
    }

    #[tokio::test]
    async fn missing_email_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (store, pool) = store(&dir).await;

        let outcome = SignInReconciler::new(Arc::new(store))
            .reconcile(&identity("sub-anon", None, "access"), SignInPolicy::Reconcile)
            .await
            .unwrap();

        assert_eq!(outcome, SignInOutcome::Denied(DenyReason::MissingEmail));
        assert_eq!(count(&pool, "users").await, 0);
        assert_eq!(count(&pool, "accounts").await, 0);
    }

    #[tokio::test]
    async fn concurrent_sign_ins_of_one_user_all_succeed() {
        let dir = TempDir::new().unwrap();
        let (store, pool) = store(&dir).await;
        let reconciler = SignInReconciler::new(Arc::new(store));

        for round in 0..10 {
            let mut tasks = JoinSet::new();
            for i in 0..4 {
                let reconciler = reconciler.clone();
                tasks.spawn(async move {
                    reconciler
                        .reconcile(
                            &identity(
                                "sub-ada",
                                Some("ada@example.com"),
                                &format!("access-{round}-{i}"),
                            ),
                            SignInPolicy::Reconcile,
                        )
                        .await
                });
            }
            while let Some(result) = tasks.join_next().await {
                assert!(result.unwrap().is_ok());
            }
        }

        assert_eq!(count(&pool, "users").await, 1);
        assert_eq!(count(&pool, "accounts").await, 1);
    }

    #[tokio::test]
    async fn concurrent_sign_ins_of_distinct_users_all_succeed() {
        let dir = TempDir::new().unwrap();
        let (store, pool) = store(&dir).await;
        let reconciler = SignInReconciler::new(Arc::new(store));

        let mut tasks = JoinSet::new();
        for i in 0..40 {
            let reconciler = reconciler.clone();
            tasks.spawn(async move {
                reconciler
                    .reconcile(
                        &identity(
                            &format!("sub-{i}"),
                            Some(&format!("user{i}@example.com")),
                            "access",
                        ),
                        SignInPolicy::Reconcile,
                    )
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap().is_ok());
        }

        assert_eq!(count(&pool, "users").await, 40);
        assert_eq!(count(&pool, "accounts").await, 40);
    }
}
