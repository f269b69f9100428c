//! Prometheus metrics
//!
//! The recorder is installed once per process; `/metrics` renders the
//! global handle.

use axum::{http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder
///
/// Safe to call more than once; later calls return the installed handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map(Clone::clone)
        .map_err(|e| tracing::warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Count a generated reply and record its latency
pub fn record_reply(source: &'static str, intent: &'static str, latency_ms: f64) {
    metrics::counter!("sales_assist_replies_total", "source" => source, "intent" => intent)
        .increment(1);
    metrics::histogram!("sales_assist_reply_latency_ms").record(latency_ms);
}

pub fn record_rating(rating: &'static str) {
    metrics::counter!("sales_assist_ratings_total", "rating" => rating).increment(1);
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("sales_assist_errors_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_reply("variants", "time", 1.5);
        record_rating("good");
        record_error("invalid_input");
    }
}
