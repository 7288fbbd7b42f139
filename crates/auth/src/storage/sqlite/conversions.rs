//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, Utc};
use gatehouse_core::identity::{AccountLink, Gender, TokenSet, User};
use gatehouse_core::storage::RepositoryError;

/// Columns: id, email, first_name, last_name, gender, contact_number, password, created_at, updated_at
pub type UserRow = (
    i64,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
    String,
);

/// Columns: user_id, type, provider, provider_account_id, access_token,
/// refresh_token, expires_at, token_type, scope, id_token, session_state
pub type AccountRow = (
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Convert a users row to a User.
pub fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let (
        id,
        email,
        first_name,
        last_name,
        gender,
        contact_number,
        password,
        created_at,
        updated_at,
    ) = row;

    Ok(User {
        id,
        email,
        first_name,
        last_name,
        gender: gender.parse::<Gender>().map_err(RepositoryError::InvalidData)?,
        contact_number,
        password,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert an accounts row to an AccountLink.
pub fn row_to_account(row: AccountRow) -> Result<AccountLink, RepositoryError> {
    let (
        user_id,
        account_type,
        provider,
        provider_account_id,
        access_token,
        refresh_token,
        expires_at,
        token_type,
        scope,
        id_token,
        session_state,
    ) = row;

    Ok(AccountLink {
        user_id,
        account_type,
        provider: provider
            .parse()
            .map_err(|_| RepositoryError::InvalidData(format!("unknown provider: {provider}")))?,
        provider_account_id,
        tokens: TokenSet {
            access_token,
            refresh_token,
            expires_at,
            token_type,
            scope,
            id_token,
            session_state,
        },
    })
}

/// Format a timestamp for a TEXT column.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("invalid timestamp {value}: {e}")))
}
