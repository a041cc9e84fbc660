//! Video API request metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is left
//! to the embedding application.

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total API requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "vidbox_api_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "vidbox_api_latency_seconds";
}

/// Status label used when no HTTP response was received.
pub const TRANSPORT_ERROR_STATUS: u16 = 0;

/// Record metrics for a completed API request.
pub fn record_request(operation: &'static str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation
    )
    .record(latency_ms / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.contains("requests"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_request("list_videos", 200, 12.5);
        record_request("list_videos", TRANSPORT_ERROR_STATUS, 0.0);
    }
}
