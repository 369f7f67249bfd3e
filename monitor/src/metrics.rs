use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::Once;
use tracing::error;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref CYCLES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "monitor_cycles_total",
        "Total acquisition cycles completed"
    ))
    .unwrap();
    pub static ref REMOTE_UPDATES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "monitor_remote_updates_total",
        "Cycles that merged a remote device reading"
    ))
    .unwrap();
    pub static ref SYNTHESIZED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "monitor_synthesized_total",
        "Cycles that fell back to a synthesized snapshot"
    ))
    .unwrap();
    pub static ref FETCH_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            "monitor_fetch_failures_total",
            "Failed fetches of the latest readings, by failure kind"
        ),
        &["kind"]
    )
    .unwrap();
    pub static ref OVERRIDES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "monitor_overrides_total",
        "Snapshot overrides received through the API"
    ))
    .unwrap();
    pub static ref FETCH_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "monitor_fetch_latency_seconds",
            "Time taken to fetch and parse the latest readings"
        )
        .buckets(vec![
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
}

static INIT: Once = Once::new();

/// Registers all collectors. Safe to call more than once.
pub fn init_metrics() {
    INIT.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(CYCLES_TOTAL.clone()),
            Box::new(REMOTE_UPDATES_TOTAL.clone()),
            Box::new(SYNTHESIZED_TOTAL.clone()),
            Box::new(FETCH_FAILURES_TOTAL.clone()),
            Box::new(OVERRIDES_TOTAL.clone()),
            Box::new(FETCH_LATENCY_SECONDS.clone()),
        ];

        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                error!("Failed to register metric: {}", e);
            }
        }
    });
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_metrics();
        init_metrics();

        CYCLES_TOTAL.inc();
        let text = gather_metrics();

        assert!(text.contains("monitor_cycles_total"));
    }

    #[test]
    fn test_failure_kind_label() {
        init_metrics();
        FETCH_FAILURES_TOTAL.with_label_values(&["protocol"]).inc();

        let text = gather_metrics();

        assert!(text.contains(r#"monitor_fetch_failures_total{kind="protocol"}"#));
    }
}
