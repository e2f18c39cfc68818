//! Prometheus Metrics Module
//!
//! 提供订单簿构建引擎的核心指标监控
//!
//! ## 指标类型
//! - **Counter**: 事件总数、拒绝总数
//! - **Histogram**: 事件处理延迟
//! - **Gauge**: 活跃订单数、窗口重建次数
//!
//! ## 使用示例
//! ```rust,ignore
//! use book_builder::shared::metrics::METRICS;
//!
//! METRICS.events_total.with_label_values(&["add"]).inc();
//!
//! let timer = METRICS.event_duration.with_label_values(&["add"]).start_timer();
//! // ... 处理事件 ...
//! timer.observe_duration();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, Encoder,
    GaugeVec, HistogramVec, TextEncoder,
};

lazy_static! {
    /// 全局Metrics实例
    pub static ref METRICS: Metrics = Metrics::new();
}

/// 订单簿引擎核心指标
pub struct Metrics {
    /// 事件总数 (按类型: add/delete/modify/replace/exec/reset)
    pub events_total: CounterVec,

    /// 被拒绝的事件 (按原因)
    pub rejections_total: CounterVec,

    /// 事件处理延迟分布 (秒)
    pub event_duration: HistogramVec,

    /// 活跃订单数 (买/卖)
    pub live_orders: GaugeVec,

    /// 窗口重建次数 (build/high/low)
    pub window_rebuilds: GaugeVec,
}

impl Metrics {
    /// 创建新的Metrics实例
    pub fn new() -> Self {
        Self {
            events_total: register_counter_vec!(
                "book_events_total",
                "Total number of order lifecycle events received",
                &["event"]
            )
            .expect("book_events_total registers once"),

            rejections_total: register_counter_vec!(
                "book_rejections_total",
                "Total number of rejected events",
                &["reason"]
            )
            .expect("book_rejections_total registers once"),

            event_duration: register_histogram_vec!(
                "book_event_duration_seconds",
                "Event processing duration in seconds",
                &["event"],
                vec![1e-7, 5e-7, 1e-6, 5e-6, 1e-5, 5e-5, 1e-4, 1e-3]
            )
            .expect("book_event_duration_seconds registers once"),

            live_orders: register_gauge_vec!(
                "book_live_orders",
                "Orders currently tracked in the ledger",
                &["side"]
            )
            .expect("book_live_orders registers once"),

            window_rebuilds: register_gauge_vec!(
                "book_window_rebuilds",
                "Level window builds and recentrings since start",
                &["kind"]
            )
            .expect("book_window_rebuilds registers once"),
        }
    }

    /// 导出Prometheus格式的指标
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
