//! hostpanel authentication daemon.
//!
//! Exposes the UserService gRPC API behind the session request gate:
//! registration and login are public (rate limited), everything else
//! requires a valid session token.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tokio::signal;
use tonic::transport::Server;
use tracing_subscriber::EnvFilter;

use hostpanel_auth::{Allowlist, SessionKeyring};
use hostpanel_proto::user_service_server::UserServiceServer;
use hostpanel_proto::FILE_DESCRIPTOR_SET;

use hostpanel_authd::config::Config;
use hostpanel_authd::gate::{RequestGate, SessionGateLayer};
use hostpanel_authd::services::{AuthRateLimiter, UserServiceImpl};
use hostpanel_authd::store::CredentialStore;

/// hostpanel authentication daemon
#[derive(Parser)]
#[command(name = "hostpanel-authd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon server (default if no command given)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) | None => cmd_serve().await,
    }
}

/// Start the daemon server.
async fn cmd_serve() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let pool =
        SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.db_path.display())).await?;

    let store = Arc::new(CredentialStore::new(pool).await?);
    let sessions = Arc::new(SessionKeyring::new(
        &config.session_keys,
        config.session_ttl_secs,
    )?);
    tracing::info!(
        keys = config.session_keys.len(),
        ttl_secs = config.session_ttl_secs,
        "Session keyring initialized"
    );

    // Registration and login are the only unauthenticated RPCs; reflection
    // stays reachable so tooling can discover the API. The gate throttles
    // these public methods per peer and leaves authenticated traffic alone.
    let allowlist = Arc::new(Allowlist::new([
        "LoginUser",
        "RegisterUser",
        "ServerReflectionInfo",
    ]));
    let gate = RequestGate::new(allowlist, sessions.clone(), AuthRateLimiter::default());

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let service = UserServiceImpl::new(store, sessions);

    tracing::info!(addr = %config.grpc_addr, "hostpanel auth daemon starting");

    Server::builder()
        .layer(SessionGateLayer::new(gate))
        .add_service(reflection)
        .add_service(UserServiceServer::new(service))
        .serve_with_shutdown(config.grpc_addr, shutdown_signal())
        .await?;

    tracing::info!("Daemon shutdown complete");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
