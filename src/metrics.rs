//! Prometheus exposition for the rotation loop.

use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use crate::error::MetricsError;

const UP_GAUGE: &str = "dependabot_up";
const ROTATIONS_TOTAL: &str = "dependabot_secret_rotations_total";

/// Records rotation-cycle outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Mark the process live. Set once the exporter is installed.
    pub fn set_up(&self) {
        gauge!(UP_GAUGE).set(1.0);
    }

    /// Record the outcome of one rotation cycle.
    pub fn record_rotation(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(ROTATIONS_TOTAL, "status" => status).increment(1);
    }

    /// Describe and pre-register instruments so the exposition is complete
    /// before the first cycle runs.
    fn register(&self) {
        describe_gauge!(UP_GAUGE, Unit::Count, "Whether the rotator is running");
        describe_counter!(
            ROTATIONS_TOTAL,
            Unit::Count,
            "Rotation cycles grouped by outcome"
        );

        gauge!(UP_GAUGE).set(0.0);
        for status in ["success", "error"] {
            counter!(ROTATIONS_TOTAL, "status" => status).absolute(0);
        }
    }
}

/// Install the Prometheus exporter on `addr` and return the recorder.
///
/// The exporter's listener answers `/metrics` (and every other path) with
/// the exposition, matching the fixed-port scrape target contract.
pub fn init_metrics(addr: &str) -> Result<MetricsRecorder, MetricsError> {
    let socket_addr: SocketAddr = addr.parse().map_err(|source| MetricsError::InvalidAddr {
        addr: addr.to_string(),
        source,
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .install()
        .map_err(|e| MetricsError::ExporterInstall(e.to_string()))?;

    let recorder = MetricsRecorder::new();
    recorder.register();
    recorder.set_up();

    info!(metrics_addr = %socket_addr, "prometheus exposition listening");
    Ok(recorder)
}
