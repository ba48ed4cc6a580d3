//! 页面日志事件模型
//!
//! 面板页面通过命令层提交的日志事件,进入事件日志前的传输格式。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::log_entry::{LogCategory, LogLevel};

/// 页面提交的单条日志事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLogEvent {
    /// 日志级别
    pub level: LogLevel,
    /// 日志分类,缺省为业务逻辑
    #[serde(default = "default_category")]
    pub category: LogCategory,
    /// 日志消息
    pub message: String,
    /// 附加数据 (JSON格式)
    #[serde(default)]
    pub data: Option<Value>,
    /// 提交事件的页面,缺省沿用当前页面
    #[serde(default)]
    pub page: Option<String>,
}

fn default_category() -> LogCategory {
    LogCategory::BusinessLogic
}

impl ClientLogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            category: default_category(),
            message: message.into(),
            data: None,
            page: None,
        }
    }

    pub fn with_category(mut self, category: LogCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let event: ClientLogEvent =
            serde_json::from_str(r#"{"level":2,"message":"No readings to save"}"#).unwrap();

        assert_eq!(event.level, LogLevel::Warn);
        assert_eq!(event.category, LogCategory::BusinessLogic);
        assert!(event.data.is_none());
        assert!(event.page.is_none());
    }
}
