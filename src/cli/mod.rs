use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::app::{app, AppState};
use crate::auth::{TokenIssuer, VerificationKeys};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgRepository};
use crate::storage::FileStore;

#[derive(Parser, Debug)]
#[command(name = "smart-survey-api")]
#[command(about = "Organizations, members and attachment storage API")]
#[command(version)]
pub struct Cli {
    /// Print a bearer token for this member, signed by this process's key
    #[arg(long, value_name = "MEMBER_ID")]
    pub issue_token_for: Option<Uuid>,

    /// Start without applying database migrations
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Log level comes from RUST_LOG when set, otherwise from the config
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    info!("Starting smart-survey-api in {:?} mode", config.environment);

    // One keypair per process; tokens do not survive a restart
    let issuer = TokenIssuer::generate(&config.security).context("failed to generate signing key")?;
    let keys = VerificationKeys::for_issuer(&issuer).context("failed to derive verification key")?;
    if let Some(member_id) = cli.issue_token_for {
        let token = issuer.issue(member_id).context("failed to issue token")?;
        println!("{}", token);
        info!("Issued bearer token for member {}", member_id);
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if cli.skip_migrations {
        warn!("Skipping database migrations");
    } else {
        DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
    }

    let files = FileStore::from_config(&config.storage).context("failed to configure object store")?;
    let repository = Arc::new(PgRepository::new(pool.clone()));
    let state = AppState::new(
        &config,
        repository.clone(),
        repository,
        files,
        keys,
        pool.clone(),
    );
    let router = app(state, &config);

    let bind_addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.wait_for(|stop| *stop).await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            res.context("server task panicked")?.context("server error")?;
            DatabaseManager::close(&pool).await;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    let grace = config.server.shutdown_grace();
    info!("Shutdown requested, draining requests for up to {:?}", grace);
    let _ = stop_tx.send(true);

    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => info!("Server stopped"),
        Ok(Ok(Err(e))) => error!("Server error during shutdown: {}", e),
        Ok(Err(e)) => error!("Server task failed during shutdown: {}", e),
        Err(_) => {
            warn!("Grace period elapsed, closing remaining connections");
            server.abort();
        }
    }

    DatabaseManager::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
