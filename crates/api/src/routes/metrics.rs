//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers help text for the counters the service emits.
pub fn describe() {
    metrics::describe_counter!(
        "commands_handled_total",
        "Commands handled, by action and outcome"
    );
    metrics::describe_counter!("events_published_total", "Events published to the event log");
    metrics::describe_counter!(
        "events_applied_total",
        "Events applied to the item collection, by action"
    );
    metrics::describe_counter!(
        "events_ignored_total",
        "Replayed events with an unregistered action"
    );
    metrics::describe_counter!(
        "replay_failures_total",
        "Replay deliveries or events that could not be applied, by stage"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
