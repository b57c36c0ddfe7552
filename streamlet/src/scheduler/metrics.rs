use commonware_runtime::Metrics as RuntimeMetrics;
use prometheus_client::metrics::{counter::Counter, gauge::Gauge};

/// Metrics for the [Scheduler](super::Scheduler).
#[derive(Default)]
pub struct Metrics {
    /// Epoch currently being simulated
    pub epoch: Gauge,
    /// Number of messages delivered to nodes
    pub delivered: Counter,
    /// Number of messages produced by nodes
    pub produced: Counter,
}

impl Metrics {
    /// Create and return a new set of metrics, registered with the given context.
    pub fn init<E: RuntimeMetrics>(context: E) -> Self {
        let metrics = Metrics::default();
        context.register(
            "epoch",
            "Epoch currently being simulated",
            metrics.epoch.clone(),
        );
        context.register(
            "delivered",
            "Number of messages delivered to nodes",
            metrics.delivered.clone(),
        );
        context.register(
            "produced",
            "Number of messages produced by nodes",
            metrics.produced.clone(),
        );
        metrics
    }
}
