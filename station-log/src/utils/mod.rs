//! 工具模块
//!
//! - logger: 进程日志 (tracing订阅器) 初始化
//! - ids: 日志/会话/请求标识符生成
//! - time_utils: 时间格式化与耗时计算

pub mod ids;
pub mod logger;
pub mod time_utils;
