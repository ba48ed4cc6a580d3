//! 服务层模块
//!
//! 包含所有日志与埋点服务:
//! - `event_log`: 会话级事件日志存储,环形缓冲区
//! - `log_export`: JSON/CSV导出
//! - `http_transport`: HTTP传输抽象与reqwest实现
//! - `api_instrumentation`: 包装传输层,记录每次请求/响应/错误
//! - `runtime_capture`: panic 与后台任务失败捕获
//! - `performance_monitor`: 页面加载计时
//! - `log_forwarder`: 日志远程上报队列
//! - `config_service`: .env 配置加载与保存
//!
//! # 服务架构
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ InstrumentedClient│   │  runtime_capture │   │performance_monitor│
//! └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘
//!          │                      │                      │
//!          ▼                      ▼                      ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     EventLog (Arc)                            │
//! │   环形缓冲区 ── tracing 控制台镜像 ── ForwarderHandle          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ try_send
//!                                ▼
//!                     LogForwarder ──► POST /api/logs
//! ```
//!
//! # 使用示例
//!
//! ```no_run
//! use std::sync::Arc;
//! use station_log::models::{ApiClientConfig, LogFilter, LogLevel};
//! use station_log::services::{EventLog, InstrumentedClient, ReqwestTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log = Arc::new(EventLog::new(1000));
//! log.set_current_page("Dashboard");
//!
//! let transport = ReqwestTransport::new(&ApiClientConfig::default())?;
//! let api = InstrumentedClient::new(transport, Arc::clone(&log));
//! let _tanks = api.get("/api/tanks").await?;
//!
//! let errors = log.get_logs(&LogFilter::for_level(LogLevel::Error));
//! # let _ = errors;
//! # Ok(())
//! # }
//! ```

pub mod api_instrumentation;
pub mod config_service;
pub mod event_log;
pub mod http_transport;
pub mod log_export;
pub mod log_forwarder;
pub mod performance_monitor;
pub mod runtime_capture;

// 重导出常用类型,简化外部引用
pub use api_instrumentation::InstrumentedClient;
pub use config_service::ConfigService;
pub use event_log::EventLog;
pub use http_transport::{HttpTransport, ReqwestTransport};
pub use log_export::ExportFormat;
pub use log_forwarder::{
    ForwardOutcome, ForwarderHandle, ForwarderReport, HttpLogSink, LogForwarder, LogSink,
};
pub use performance_monitor::{record_page_load, LoadTimer, PageLoadTiming};
pub use runtime_capture::{install_panic_hook, report_rejection, spawn_observed};
