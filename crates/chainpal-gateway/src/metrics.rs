//! Prometheus metrics. Recording is a no-op without the `metrics` feature.

#[cfg(feature = "metrics")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus metrics recorder and return the handle for rendering.
#[cfg(feature = "metrics")]
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// Record a chat reply stream being opened.
pub fn record_stream_opened() {
    #[cfg(feature = "metrics")]
    metrics::counter!("chat_streams_total").increment(1);
}

/// Record an HTTP request with its duration.
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    #[cfg(feature = "metrics")]
    {
        let labels = [("route", route.to_string()), ("status", status.to_string())];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels).record(duration_secs);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (route, status, duration_secs);
}

/// Record an error of a given kind.
pub fn record_error(kind: &str) {
    #[cfg(feature = "metrics")]
    {
        let labels = [("kind", kind.to_string())];
        metrics::counter!("errors_total", &labels).increment(1);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}
