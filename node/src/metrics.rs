//! # Prometheus Metrics
//!
//! Request counters and latency for the construction endpoints. Scraped by
//! Prometheus at `/metrics` on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Requests received, by endpoint.
    pub requests_total: IntCounterVec,
    /// Failed requests, by endpoint and Rosetta error code.
    pub errors_total: IntCounterVec,
    /// Request handling latency in seconds, by endpoint.
    pub request_duration_seconds: HistogramVec,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("rosetta".into()), None)?;

        let requests_total = IntCounterVec::new(
            Opts::new(
                "construction_requests_total",
                "Total construction API requests received",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let errors_total = IntCounterVec::new(
            Opts::new(
                "construction_errors_total",
                "Total construction API requests that returned an error",
            ),
            &["endpoint", "code"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "construction_request_duration_seconds",
                "Construction API request latency in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            errors_total,
            request_duration_seconds,
        })
    }

    /// Records one handled request.
    pub fn observe(&self, endpoint: &str, elapsed: Duration, error_code: Option<u32>) {
        self.requests_total.with_label_values(&[endpoint]).inc();
        self.request_duration_seconds
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
        if let Some(code) = error_code {
            self.errors_total
                .with_label_values(&[endpoint, &code.to_string()])
                .inc();
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_counts_requests_and_errors() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.observe("payloads", Duration::from_millis(3), None);
        metrics.observe("payloads", Duration::from_millis(5), Some(5));

        assert_eq!(
            metrics.requests_total.with_label_values(&["payloads"]).get(),
            2
        );
        assert_eq!(
            metrics
                .errors_total
                .with_label_values(&["payloads", "5"])
                .get(),
            1
        );
    }

    #[test]
    fn encode_uses_namespace() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.observe("derive", Duration::from_millis(1), None);
        let text = metrics.encode().unwrap();
        assert!(text.contains("rosetta_construction_requests_total"));
        assert!(text.contains("endpoint=\"derive\""));
    }
}
