use std::env;

/// Default SQLite database URL. `mode=rwc` creates the file on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://gatehouse.db?mode=rwc";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite connection URL for the user and flow stores.
    pub database_url: String,
    /// Maximum pool connections (default: 5)
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite URL (default: `sqlite://gatehouse.db?mode=rwc`)
    /// - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(5),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_and_defaults() {
        // Both cases share one test since they mutate the same variables.
        {
            env::remove_var("DATABASE_URL");
            env::remove_var("DATABASE_MAX_CONNECTIONS");
        }

        let config = Config::from_env();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_connections, 5);

        {
            env::set_var("DATABASE_URL", "sqlite::memory:");
            env::set_var("DATABASE_MAX_CONNECTIONS", "not-a-number");
        }

        let config = Config::from_env();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 5);

        {
            env::remove_var("DATABASE_URL");
            env::remove_var("DATABASE_MAX_CONNECTIONS");
        }
    }
}
