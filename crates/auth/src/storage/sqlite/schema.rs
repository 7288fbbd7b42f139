//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT,
    gender TEXT NOT NULL DEFAULT 'OTHER',
    contact_number TEXT NOT NULL DEFAULT '',
    password TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Provider account links
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    type TEXT NOT NULL,
    provider TEXT NOT NULL,
    provider_account_id TEXT NOT NULL,
    access_token TEXT,
    refresh_token TEXT,
    expires_at INTEGER,
    token_type TEXT,
    scope TEXT,
    id_token TEXT,
    session_state TEXT,
    UNIQUE (provider, provider_account_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_accounts_user_id ON accounts(user_id);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (email, first_name, last_name, gender, contact_number, password, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, first_name, last_name, gender, contact_number, password, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, first_name, last_name, gender, contact_number, password, created_at, updated_at
FROM users
WHERE email = ?1
"#;

// Account queries

/// Insert a link, or refresh the token columns of the existing one.
///
/// Columns the provider left out (`NULL`) keep their stored value.
pub const UPSERT_ACCOUNT: &str = r#"
INSERT INTO accounts (user_id, type, provider, provider_account_id, access_token, refresh_token, expires_at, token_type, scope, id_token, session_state)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
ON CONFLICT (provider, provider_account_id) DO UPDATE SET
    access_token = COALESCE(excluded.access_token, accounts.access_token),
    refresh_token = COALESCE(excluded.refresh_token, accounts.refresh_token),
    expires_at = COALESCE(excluded.expires_at, accounts.expires_at),
    token_type = COALESCE(excluded.token_type, accounts.token_type),
    scope = COALESCE(excluded.scope, accounts.scope),
    id_token = COALESCE(excluded.id_token, accounts.id_token),
    session_state = COALESCE(excluded.session_state, accounts.session_state)
RETURNING user_id, type, provider, provider_account_id, access_token, refresh_token, expires_at, token_type, scope, id_token, session_state
"#;

pub const SELECT_ACCOUNT: &str = r#"
SELECT user_id, type, provider, provider_account_id, access_token, refresh_token, expires_at, token_type, scope, id_token, session_state
FROM accounts
WHERE provider = ?1 AND provider_account_id = ?2
"#;
