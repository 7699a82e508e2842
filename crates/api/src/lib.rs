//! HTTP transport for the shipment item aggregate.
//!
//! Accepts command envelopes over HTTP, keeps the item collection caught up
//! with the event log, and exposes replay controls, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{CommandContext, ItemService, UpdatePolicy};
use event_store::InMemoryEventLog;
use item_store::ItemStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{DomainApplier, StateBuilder};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Item store shared by the command handlers and the projector.
pub type SharedItemStore = Arc<dyn ItemStore>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: ItemService<SharedItemStore>,
    pub state_builder: StateBuilder<InMemoryEventLog, DomainApplier<SharedItemStore>>,
    pub events: InMemoryEventLog,
}

/// Wires the command service and the state builder over one item store and one event log.
pub fn create_state(store: SharedItemStore, events: InMemoryEventLog, config: &Config) -> Arc<AppState> {
    let ctx = CommandContext::new(store.clone(), config.service_name.clone()).with_policy(
        UpdatePolicy {
            lock_lot: config.lock_lot,
        },
    );

    Arc::new(AppState {
        service: ItemService::new(ctx),
        state_builder: StateBuilder::new(
            events.clone(),
            DomainApplier::new(store),
            config.replay_timeout,
        ),
        events,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/commands", post(routes::commands::handle))
        .route("/events", get(routes::commands::events))
        .route("/replay", post(routes::replay::catch_up))
        .route("/replay/rebuild", post(routes::replay::rebuild))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
