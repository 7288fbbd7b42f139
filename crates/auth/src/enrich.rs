//! Session enrichment from the user store.

use std::sync::Arc;

use gatehouse_core::auth::{enrich_session, Session};
use gatehouse_core::storage::UserRepository;

use crate::error::AuthError;

/// Adds locally stored profile fields to decoded sessions.
#[derive(Clone)]
pub struct SessionEnricher {
    users: Arc<dyn UserRepository>,
}

impl SessionEnricher {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Look up the session's user by email and copy id and names onto it.
    ///
    /// Sessions without an email, or whose email matches no user, come back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Store failures propagate.
    pub async fn enrich(&self, session: Session) -> Result<Session, AuthError> {
        let Some(email) = session.user.email.clone() else {
            return Ok(session);
        };

        let user = self.users.get_user_by_email(&email).await?;
        if user.is_none() {
            tracing::debug!(email = %email, "No local user for session, passing it through");
        }

        Ok(enrich_session(session, user.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use gatehouse_core::auth::SessionUser;
    use gatehouse_core::identity::NewUser;

    use crate::storage::InMemoryUserStore;

    fn session(email: Option<&str>) -> Session {
        Session {
            user: SessionUser {
                name: Some("Ada Lovelace".to_string()),
                email: email.map(String::from),
                ..Default::default()
            },
            expires: Utc::now() + Duration::days(30),
        }
    }

    async fn store_with_ada(last_name: Option<&str>) -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        let mut uow = store.begin().await.unwrap();
        let mut new_user = NewUser::from_provider("ada@example.com", Some("Ada"));
        new_user.last_name = last_name.map(String::from);
        uow.create_user(&new_user).await.unwrap();
        uow.commit().await.unwrap();
        store
    }

    #[tokio::test]
    async fn matching_user_enriches_session() {
        let store = store_with_ada(Some("Lovelace")).await;
        let enricher = SessionEnricher::new(Arc::new(store));

        let enriched = enricher
            .enrich(session(Some("ada@example.com")))
            .await
            .unwrap();

        assert_eq!(enriched.user.id.as_deref(), Some("1"));
        assert_eq!(enriched.user.first_name.as_deref(), Some("Ada"));
        assert_eq!(enriched.user.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(enriched.user.name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn stored_null_last_name_becomes_empty() {
        let store = store_with_ada(None).await;
        let enricher = SessionEnricher::new(Arc::new(store));

        let enriched = enricher
            .enrich(session(Some("ada@example.com")))
            .await
            .unwrap();

        assert_eq!(enriched.user.last_name.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn unknown_email_or_no_email_leaves_session_unchanged() {
        let store = store_with_ada(Some("Lovelace")).await;
        let enricher = SessionEnricher::new(Arc::new(store));

        for original in [session(Some("grace@example.com")), session(None)] {
            let enriched = enricher.enrich(original.clone()).await.unwrap();
            assert_eq!(enriched, original);
        }
    }
}
