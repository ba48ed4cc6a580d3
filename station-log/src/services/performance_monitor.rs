//! 页面加载性能
//!
//! `LoadTimer` 以导航开始为零点,依次打点:
//! 首字节响应 → DOM就绪 → 加载完成。

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{EntryDetails, LogCategory, LogLevel, PerformanceInfo};
use crate::services::event_log::EventLog;

/// 页面加载耗时 (毫秒)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLoadTiming {
    pub dom_content_loaded_ms: u64,
    /// 以首字节响应近似首次绘制
    pub first_paint_ms: u64,
    pub total_load_ms: u64,
    /// 内存占用 (字节),无法获取时为 None
    pub memory_usage: Option<u64>,
}

impl PageLoadTiming {
    pub fn with_memory_usage(mut self, bytes: u64) -> Self {
        self.memory_usage = Some(bytes);
        self
    }
}

/// 页面加载计时器
#[derive(Debug, Clone)]
pub struct LoadTimer {
    navigation_start: Instant,
    response_start: Option<Instant>,
    dom_content_loaded: Option<Instant>,
}

impl LoadTimer {
    /// 从当前时刻开始计时
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(navigation_start: Instant) -> Self {
        Self {
            navigation_start,
            response_start: None,
            dom_content_loaded: None,
        }
    }

    pub fn mark_response_start(&mut self) {
        self.response_start = Some(Instant::now());
    }

    pub fn mark_dom_content_loaded(&mut self) {
        self.dom_content_loaded = Some(Instant::now());
    }

    /// 结束计时
    ///
    /// 任一打点缺失时返回 None,不记录不完整的数据
    pub fn finish(self) -> Option<PageLoadTiming> {
        let load_end = Instant::now();
        let since_start = |mark: Instant| {
            u64::try_from(mark.saturating_duration_since(self.navigation_start).as_millis())
                .unwrap_or(u64::MAX)
        };

        Some(PageLoadTiming {
            dom_content_loaded_ms: since_start(self.dom_content_loaded?),
            first_paint_ms: since_start(self.response_start?),
            total_load_ms: since_start(load_end),
            memory_usage: None,
        })
    }
}

/// 记录一条页面加载性能日志
pub fn record_page_load(log: &EventLog, timing: &PageLoadTiming) {
    let performance = PerformanceInfo {
        duration: timing.total_load_ms,
        memory_usage: timing.memory_usage,
    };

    log.log_with(
        LogLevel::Info,
        LogCategory::Performance,
        "Page Load Performance",
        EntryDetails::default()
            .with_performance(performance)
            .with_data(json!({
                "timing": {
                    "domContentLoaded": timing.dom_content_loaded_ms,
                    "firstPaint": timing.first_paint_ms,
                    "totalLoad": timing.total_load_ms,
                }
            })),
    );
}
