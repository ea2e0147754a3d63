//! 追踪初始化与进程指标。

use serde::Serialize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub active_connections: u64,
    pub accept_errors: u64,
    pub stream_faults: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    active_connections: AtomicU64,
    accept_errors: AtomicU64,
    stream_faults: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            connections_opened: AtomicU64::new(0),
            connections_closed: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            accept_errors: AtomicU64::new(0),
            stream_faults: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            accept_errors: self.accept_errors.load(Ordering::Relaxed),
            stream_faults: self.stream_faults.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 记录连接打开（记录创建成功后调用）。
pub fn record_connection_opened() {
    let metrics = metrics();
    metrics.connections_opened.fetch_add(1, Ordering::Relaxed);
    metrics.active_connections.fetch_add(1, Ordering::Relaxed);
}

/// 记录连接关闭（关闭记录写入后调用）。
pub fn record_connection_closed() {
    let metrics = metrics();
    metrics.connections_closed.fetch_add(1, Ordering::Relaxed);
    let _ = metrics
        .active_connections
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
            Some(value.saturating_sub(1))
        });
}

/// 记录一次 accept 失败。
pub fn record_accept_error() {
    metrics().accept_errors.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次流处理故障。
pub fn record_stream_fault() {
    metrics().stream_faults.fetch_add(1, Ordering::Relaxed);
}
