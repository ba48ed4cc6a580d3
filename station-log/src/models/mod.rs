//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (HTTP、上报、导出、配置、应用级错误)
//! - log_entry: 日志条目、级别与分类
//! - log_filter: 日志查询过滤条件
//! - api_request: REST请求与响应
//! - telemetry_config: 遥测配置
//! - client_event: 页面提交的日志事件

pub mod api_request;
pub mod client_event;
pub mod errors;
pub mod log_entry;
pub mod log_filter;
pub mod telemetry_config;

// 重导出常用类型,简化外部引用
pub use api_request::{ApiRequest, ApiResponse};
pub use client_event::ClientLogEvent;
pub use errors::{AppError, ConfigError, ExportError, ForwardError, HttpError};
pub use log_entry::{
    ApiCallInfo, EntryDetails, ErrorInfo, LogCategory, LogEntry, LogLevel, LogStats,
    PerformanceInfo, SessionInfo,
};
pub use log_filter::LogFilter;
pub use telemetry_config::{ApiClientConfig, RuntimeEnvironment, TelemetryConfig};
