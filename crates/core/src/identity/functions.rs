use super::{AccountLink, Gender, NewUser, TokenSet};
use crate::auth::ProviderIdentity;

/// Split a provider display name into first and last name.
///
/// The first name is everything before the first space; the last name is
/// everything after it. A missing name gives two empty strings.
pub fn split_display_name(name: Option<&str>) -> (String, String) {
    match name {
        Some(name) => match name.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.to_string()),
            None => (name.to_string(), String::new()),
        },
        None => (String::new(), String::new()),
    }
}

impl NewUser {
    /// Profile for a user first seen through a provider sign-in.
    pub fn from_provider(email: &str, display_name: Option<&str>) -> Self {
        let (first_name, last_name) = split_display_name(display_name);

        Self {
            email: email.to_string(),
            first_name,
            last_name: Some(last_name),
            gender: Gender::default(),
            contact_number: String::new(),
            password: String::new(),
        }
    }
}

impl AccountLink {
    /// Account link for `identity`, owned by `user_id`.
    pub fn from_identity(identity: &ProviderIdentity, user_id: i64) -> Self {
        Self {
            user_id,
            account_type: identity.provider.account_type().to_string(),
            provider: identity.provider,
            provider_account_id: identity.provider_account_id.clone(),
            tokens: identity.tokens.clone(),
        }
    }
}

impl TokenSet {
    /// Overlay freshly issued tokens on stored ones.
    ///
    /// Fields the provider did not send keep their stored value; Google only
    /// sends a refresh token on first consent, for example.
    pub fn merged_over(&self, stored: &TokenSet) -> TokenSet {
        TokenSet {
            access_token: self.access_token.clone().or_else(|| stored.access_token.clone()),
            refresh_token: self
                .refresh_token
                .clone()
                .or_else(|| stored.refresh_token.clone()),
            expires_at: self.expires_at.or(stored.expires_at),
            token_type: self.token_type.clone().or_else(|| stored.token_type.clone()),
            scope: self.scope.clone().or_else(|| stored.scope.clone()),
            id_token: self.id_token.clone().or_else(|| stored.id_token.clone()),
            session_state: self
                .session_state
                .clone()
                .or_else(|| stored.session_state.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::OidcProvider;

    #[test]
    fn two_word_name_splits_into_first_and_last() {
        assert_eq!(
            split_display_name(Some("Ada Lovelace")),
            ("Ada".to_string(), "Lovelace".to_string())
        );
    }

    #[test]
    fn single_word_name_has_empty_last_name() {
        assert_eq!(
            split_display_name(Some("Prince")),
            ("Prince".to_string(), String::new())
        );
    }

    #[test]
    fn missing_name_gives_empty_names() {
        assert_eq!(split_display_name(None), (String::new(), String::new()));
    }

    #[test]
    fn only_the_first_space_splits() {
        assert_eq!(
            split_display_name(Some("Mary Ann Evans")),
            ("Mary".to_string(), "Ann Evans".to_string())
        );
        assert_eq!(
            split_display_name(Some("Ada  Lovelace")),
            ("Ada".to_string(), " Lovelace".to_string())
        );
    }

    #[test]
    fn new_provider_user_gets_placeholder_profile() {
        let user = NewUser::from_provider("ada@example.com", Some("Ada Lovelace"));

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(user.gender, Gender::Other);
        assert!(user.contact_number.is_empty());
        assert!(user.password.is_empty());
    }

    #[test]
    fn account_link_copies_identity_and_tokens() {
        let identity = ProviderIdentity {
            provider: OidcProvider::Google,
            provider_account_id: "1234567890".to_string(),
            email: Some("ada@example.com".to_string()),
            name: None,
            image: None,
            tokens: TokenSet {
                access_token: Some("ya29.token".to_string()),
                scope: Some("openid email profile".to_string()),
                ..Default::default()
            },
        };

        let link = AccountLink::from_identity(&identity, 9);

        assert_eq!(link.user_id, 9);
        assert_eq!(link.account_type, "oidc");
        assert_eq!(link.provider, OidcProvider::Google);
        assert_eq!(link.provider_account_id, "1234567890");
        assert_eq!(link.tokens, identity.tokens);
    }

    #[test]
    fn merged_tokens_prefer_fresh_values_and_keep_missing_ones() {
        let stored = TokenSet {
            access_token: Some("old-access".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(100),
            ..Default::default()
        };
        let fresh = TokenSet {
            access_token: Some("new-access".to_string()),
            expires_at: Some(200),
            ..Default::default()
        };

        let merged = fresh.merged_over(&stored);

        assert_eq!(merged.access_token.as_deref(), Some("new-access"));
        assert_eq!(merged.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(merged.expires_at, Some(200));
        assert_eq!(merged.scope, None);
    }
}
