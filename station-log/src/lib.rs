//! 加油站管理面板 - 会话级结构化事件日志
//!
//! - `models`: 日志条目、过滤条件、请求/响应、配置与错误类型
//! - `services`: 事件日志、导出、HTTP埋点、运行时捕获、性能计时、远程上报、配置
//! - `commands`: 日志查看页与业务页面调用的命令
//! - `state`: 应用全局状态
//! - `utils`: 进程日志、ID生成、时间工具

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use models::{LogCategory, LogEntry, LogFilter, LogLevel};
pub use services::{EventLog, ExportFormat, InstrumentedClient};
pub use state::AppState;
