use std::sync::Arc;

use tokio::net::TcpListener;
use todo_core::{MemoryStorage, Storage, TodoService};
use todo_server::{Config, PgStorage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todo_server=debug,todo_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            std::process::exit(1);
        }
    };
    tracing::info!(storage_mode = ?config.storage_mode, "configuration loaded");

    let postgres = match &config.database {
        Some(database) => match connect(database).await {
            Ok(storage) => Some(storage),
            Err(error) => {
                tracing::error!(%error, "failed to initialize database");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let storage: Arc<dyn Storage> = match &postgres {
        Some(pg) => Arc::new(pg.clone()),
        None => Arc::new(MemoryStorage::new()),
    };
    let app = todo_server::router(TodoService::new(storage));

    let addr = config.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!("listening on {addr}");

    let served = todo_server::run_until(listener, app, shutdown_signal()).await;

    if let Some(pg) = postgres {
        pg.close().await;
    }

    if let Err(error) = served {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }
    tracing::info!("server stopped");
}

async fn connect(
    database: &todo_server::config::DatabaseConfig,
) -> Result<PgStorage, todo_core::StorageError> {
    let storage = PgStorage::connect(database).await?;
    storage.ensure_schema().await?;
    tracing::info!(max_connections = database.max_connections, "database ready");
    Ok(storage)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
