use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化进程日志的错误类型
pub type LoggerInitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 环境变量过滤器
///
/// 默认: INFO级别,可通过 RUST_LOG=debug 覆盖。
/// 事件日志的控制台镜像使用 `station_log::console` 目标,
/// 例如 RUST_LOG=station_log::console=debug 可显示DEBUG条目。
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化控制台日志
///
/// 人类可读格式,事件日志的每条记录都会镜像到这里。
/// 重复调用返回错误而不是 panic。
pub fn init() -> Result<(), LoggerInitError> {
    let console_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_target(true)
        .with_level(true)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .try_init()?;

    Ok(())
}

/// 初始化控制台 + 文件日志
///
/// - 文件层: JSON格式,按天轮转 (station-log.2026-10-17.log)
/// - non_blocking: 避免日志I/O阻塞调用方
///
/// # 重要提示
/// 返回的guard必须被调用者保存,直到应用退出。
/// 如果guard被drop,文件写入器将被关闭。
///
/// # 示例日志
/// ```json
/// {
///   "timestamp": "2026-10-17T08:30:45.123Z",
///   "level": "WARN",
///   "target": "station_log::console",
///   "fields": {
///     "category": "BUSINESS_LOGIC",
///     "page": "Readings",
///     "message": "[BUSINESS_LOGIC] No readings to save - form is empty"
///   }
/// }
/// ```
pub fn init_with_file(log_dir: impl AsRef<Path>) -> Result<WorkerGuard, LoggerInitError> {
    std::fs::create_dir_all(log_dir.as_ref())?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("station-log")
        .filename_suffix("log")
        .build(log_dir.as_ref())?;

    // guard必须被保存,否则写入器会立即关闭
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let console_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_target(true)
        .with_level(true)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn test_second_initialization_is_an_error() {
        // 同一进程中只能安装一次全局订阅器
        let first = init();
        info!("日志系统测试: INFO级别");
        warn!(page = "Tanks", "日志系统测试: WARN级别");

        if first.is_ok() {
            assert!(init().is_err());
        }
    }
}
