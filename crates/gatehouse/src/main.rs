mod app;
mod config;
mod handlers;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gatehouse_auth::{storage::InMemoryUserStore, AuthConfig, AuthState, InMemoryFlowStore};
use gatehouse_core::{
    auth::{AuthFlowRepository, RouteGate},
    storage::UserRepository,
};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{app::create_app, config::Config};

/// Gatehouse - Sign in with Google, enrich sessions, gate routes
#[derive(Parser, Debug)]
#[command(name = "gatehouse")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Keep users and auth flows in memory instead of SQLite
    #[arg(long)]
    in_memory: bool,

    /// Sign in against a local Mock IdP on this port instead of Google
    #[cfg(feature = "mock")]
    #[arg(long, env = "MOCK_IDP_PORT")]
    mock_idp_port: Option<u16>,
}

/// User and flow stores, plus the pool to close on shutdown.
struct Stores {
    users: Arc<dyn UserRepository>,
    flows: Arc<dyn AuthFlowRepository>,
    #[cfg(feature = "sqlite")]
    pool: Option<sqlx::SqlitePool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gatehouse=debug,gatehouse_auth=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let stores = init_stores(&config, cli.in_memory).await?;

    let state = init_auth(&cli, stores.users.clone(), stores.flows.clone())
        .await?
        .with_gate(RouteGate::default().with_exemption("health"));

    let app = create_app(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    #[cfg(feature = "sqlite")]
    if let Some(pool) = stores.pool {
        pool.close().await;
        tracing::debug!("Database pool closed");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Open the SQLite stores (creating their tables), or in-memory ones when
/// asked to or when built without SQLite.
async fn init_stores(config: &Config, in_memory: bool) -> Result<Stores> {
    #[cfg(feature = "sqlite")]
    if !in_memory {
        use gatehouse_auth::{storage::SqliteUserStore, SqliteFlowStore};
        use sqlx::sqlite::SqlitePoolOptions;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        let users = SqliteUserStore::new(pool.clone());
        users.migrate().await?;
        let flows = SqliteFlowStore::new(pool.clone());
        flows.migrate().await?;

        tracing::info!(database_url = %config.database_url, "Using SQLite stores");

        return Ok(Stores {
            users: Arc::new(users),
            flows: Arc::new(flows),
            pool: Some(pool),
        });
    }

    #[cfg(not(feature = "sqlite"))]
    let _ = (config, in_memory);

    tracing::info!("Using in-memory stores");

    Ok(Stores {
        users: Arc::new(InMemoryUserStore::new()),
        flows: Arc::new(InMemoryFlowStore::new()),
        #[cfg(feature = "sqlite")]
        pool: None,
    })
}

/// Build the auth state, discovering Google or wiring the Mock IdP.
async fn init_auth(
    cli: &Cli,
    users: Arc<dyn UserRepository>,
    flows: Arc<dyn AuthFlowRepository>,
) -> Result<AuthState> {
    #[cfg(feature = "mock")]
    if let Some(port) = cli.mock_idp_port {
        return init_mock_auth(port, users, flows);
    }

    #[cfg(not(feature = "mock"))]
    let _ = cli;

    let config = AuthConfig::from_env()?;
    let state = AuthState::new(users, flows, config).await?;
    tracing::info!("Google sign-in configured");

    Ok(state)
}

/// Auth state whose Google client is the mock provider, with the Mock IdP
/// served on `port`.
///
/// Client credentials are not needed; `AUTH_SECRET` falls back to a fixed
/// development key.
#[cfg(feature = "mock")]
fn init_mock_auth(
    port: u16,
    users: Arc<dyn UserRepository>,
    flows: Arc<dyn AuthFlowRepository>,
) -> Result<AuthState> {
    use gatehouse_auth::{mock_idp::MockIdpServer, MockProvider};
    use gatehouse_core::auth::OidcProvider;

    let base_url: url::Url = std::env::var("AUTH_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .parse()?;
    let secret =
        std::env::var("AUTH_SECRET").unwrap_or_else(|_| "gatehouse-development-secret".to_string());
    let config = AuthConfig::new(base_url, "mock-client-id", "mock-client-secret", secret)?;

    let idp_url = url::Url::parse(&format!("http://localhost:{port}"))?;
    let google = MockProvider::new(OidcProvider::Google, idp_url, config.google.redirect_uri.clone());

    tokio::spawn(async move {
        if let Err(e) = MockIdpServer::new(port).run().await {
            tracing::error!(error = %e, "Mock IdP server failed");
        }
    });

    tracing::warn!(port, "Using the Mock IdP for Google sign-in");

    Ok(AuthState::without_providers(users, flows, config).with_google(Arc::new(google)))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
