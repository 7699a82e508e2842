//! API server entry point.

use std::sync::Arc;

use api::SharedItemStore;
use api::config::{Config, LogFormat};
use event_store::InMemoryEventLog;
use item_store::{InMemoryItemStore, PostgresItemStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn open_item_store(config: &Config) -> SharedItemStore {
    match &config.database_url {
        Some(url) => {
            let store = PostgresItemStore::connect(url)
                .await
                .expect("failed to connect to item database");
            store
                .run_migrations()
                .await
                .expect("failed to run item store migrations");
            tracing::info!("using PostgreSQL item store");
            Arc::new(store) as SharedItemStore
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory item store");
            Arc::new(InMemoryItemStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    api::routes::metrics::describe();

    // 3. Open the item store and build application state
    let store = open_item_store(&config).await;
    let state = api::create_state(store, InMemoryEventLog::new(), &config);

    // 4. Bring the item collection up to date with the event log
    state
        .state_builder
        .catch_up()
        .await
        .expect("initial state replay failed");

    // 5. Build the application
    let app = api::create_app(state, metrics_handle);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, service = %config.service_name, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
