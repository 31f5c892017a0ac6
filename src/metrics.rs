//! Prometheus counters for layout operations.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::errors::ServiceError;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref LAYOUT_MUTATIONS: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new(
                "layout_mutations_total",
                "Committed layout mutations by operation"
            ),
            &["operation"]
        )
        .expect("metric can be created")
    );
    pub static ref LAYOUT_REJECTIONS: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new(
                "layout_rejections_total",
                "Layout operations rejected before commit"
            ),
            &["operation", "reason"]
        )
        .expect("metric can be created")
    );
    pub static ref EVENTS_PROCESSED: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new("layout_events_processed_total", "Layout events drained from the channel"),
            &["event"]
        )
        .expect("metric can be created")
    );
}

fn register(counter: IntCounterVec) -> IntCounterVec {
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric can be registered");
    counter
}

pub fn record_mutation(operation: &str) {
    LAYOUT_MUTATIONS.with_label_values(&[operation]).inc();
}

pub fn record_rejection(operation: &str, error: &ServiceError) {
    LAYOUT_REJECTIONS
        .with_label_values(&[operation, error.kind()])
        .inc();
}

/// Renders every registered metric in the Prometheus text format.
pub async fn metrics_handler() -> Result<String, ServiceError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| ServiceError::InternalError(format!("failed to encode metrics: {e}")))?;
    String::from_utf8(buffer)
        .map_err(|e| ServiceError::InternalError(format!("metrics are not UTF-8: {e}")))
}
