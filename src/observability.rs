use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Backend API usage counters
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    pub total_requests: AtomicU64,
    pub rejections: AtomicU64,
    pub transport_errors: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> GatewayStats {
        GatewayStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            requests = stats.total_requests,
            rejections = stats.rejections,
            transport_errors = stats.transport_errors,
            "Backend gateway metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayStats {
    pub total_requests: u64,
    pub rejections: u64,
    pub transport_errors: u64,
}

/// Global metrics instance
static GATEWAY_METRICS: std::sync::LazyLock<GatewayMetrics> =
    std::sync::LazyLock::new(GatewayMetrics::new);

pub fn gateway_metrics() -> &'static GatewayMetrics {
    &GATEWAY_METRICS
}

/// Time an operation
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}
