//! 运行时异常捕获
//!
//! - panic: 通过 panic hook 记录 `Global Error`,原有 hook 照常执行
//! - 后台任务失败: `spawn_observed` 观察任务结果,`Err` 记录 `Unhandled Task Rejection`

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::Display;
use std::future::Future;
use std::panic;
use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;

use crate::models::{EntryDetails, ErrorInfo, LogCategory, LogLevel};
use crate::services::event_log::EventLog;

/// 安装 panic hook
///
/// 新 hook 先记录日志,再调用之前的 hook,panic 行为本身不变。
/// 多次调用会叠加,每次 panic 每个已安装的事件日志各记录一条。
pub fn install_panic_hook(log: Arc<EventLog>) {
    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info.location();
        let thread = std::thread::current()
            .name()
            .unwrap_or("<unnamed>")
            .to_string();

        let backtrace = Backtrace::capture();
        let stack = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        let mut error = ErrorInfo::new("Panic", message.clone());
        if let Some(stack) = &stack {
            error = error.with_stack(stack.clone());
        }

        let data = json!({
            "error": {
                "name": "Panic",
                "message": message,
                "stack": stack,
            },
            "filename": location.map(|l| l.file()),
            "lineno": location.map(|l| l.line()),
            "colno": location.map(|l| l.column()),
            "thread": thread,
        });

        log.log_with(
            LogLevel::Error,
            LogCategory::Error,
            "Global Error",
            EntryDetails::default().with_data(data).with_error(error),
        );

        previous_hook(info);
    }));

    tracing::debug!("panic钩子已安装");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic payload".to_string()
    }
}

/// 启动被观察的后台任务
///
/// 任务返回 `Err` 时记录一条错误日志,任务输出原样返回给 `JoinHandle`。
pub fn spawn_observed<F, T, E>(log: Arc<EventLog>, future: F) -> JoinHandle<Result<T, E>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        let result = future.await;
        if let Err(reason) = &result {
            report_rejection(&log, reason);
        }
        result
    })
}

/// 记录一次未处理的任务失败
pub fn report_rejection(log: &EventLog, reason: &dyn Display) {
    let message = reason.to_string();

    log.log_with(
        LogLevel::Error,
        LogCategory::Error,
        "Unhandled Task Rejection",
        EntryDetails::default()
            .with_data(json!({
                "error": {
                    "name": "TaskRejection",
                    "message": message,
                }
            }))
            .with_error(ErrorInfo::new("TaskRejection", message)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_payloads() {
        let static_payload: Box<dyn Any + Send> = Box::new("pump offline");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("tank 3 overflow"));
        let other_payload: Box<dyn Any + Send> = Box::new(42_u32);

        assert_eq!(panic_message(static_payload.as_ref()), "pump offline");
        assert_eq!(panic_message(owned_payload.as_ref()), "tank 3 overflow");
        assert_eq!(panic_message(other_payload.as_ref()), "Unknown panic payload");
    }

    #[test]
    fn test_report_rejection() {
        let log = EventLog::new(10);
        report_rejection(&log, &"price sync failed");

        let entry = log.all_logs().remove(0);
        assert_eq!(entry.message, "Unhandled Task Rejection");
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.error.unwrap().name, "TaskRejection");
    }
}
