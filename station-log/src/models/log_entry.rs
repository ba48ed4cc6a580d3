//! 日志条目模型
//!
//! 定义事件日志的数据结构。条目一经创建即不可变,
//! 序列化格式与面板前端、`/api/logs` 接收端保持一致 (camelCase)。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 日志级别
///
/// 序数有意义: 按级别过滤表示"不低于该级别"。
/// JSON中序列化为序数 (DEBUG=0 ... CRITICAL=4)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    /// 全部级别,按严重程度升序
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// 级别名称 (大写),用于控制台与CSV导出
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        LogLevel::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("未知的日志级别序数: {}", value))
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "0" => Ok(LogLevel::Debug),
            "info" | "1" => Ok(LogLevel::Info),
            "warn" | "warning" | "2" => Ok(LogLevel::Warn),
            "error" | "3" => Ok(LogLevel::Error),
            "critical" | "4" => Ok(LogLevel::Critical),
            other => Err(format!("未知的日志级别: {}", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ordinal = u8::deserialize(deserializer)?;
        LogLevel::try_from(ordinal).map_err(serde::de::Error::custom)
    }
}

/// 日志分类
///
/// 封闭集合,不支持动态分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogCategory {
    Api,
    UserAction,
    FormSubmission,
    Navigation,
    Error,
    Performance,
    Security,
    Database,
    Authentication,
    BusinessLogic,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Api => "API",
            LogCategory::UserAction => "USER_ACTION",
            LogCategory::FormSubmission => "FORM_SUBMISSION",
            LogCategory::Navigation => "NAVIGATION",
            LogCategory::Error => "ERROR",
            LogCategory::Performance => "PERFORMANCE",
            LogCategory::Security => "SECURITY",
            LogCategory::Database => "DATABASE",
            LogCategory::Authentication => "AUTHENTICATION",
            LogCategory::BusinessLogic => "BUSINESS_LOGIC",
        }
    }
}

impl FromStr for LogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_ascii_uppercase().as_str() {
            "API" => LogCategory::Api,
            "USER_ACTION" => LogCategory::UserAction,
            "FORM_SUBMISSION" => LogCategory::FormSubmission,
            "NAVIGATION" => LogCategory::Navigation,
            "ERROR" => LogCategory::Error,
            "PERFORMANCE" => LogCategory::Performance,
            "SECURITY" => LogCategory::Security,
            "DATABASE" => LogCategory::Database,
            "AUTHENTICATION" => LogCategory::Authentication,
            "BUSINESS_LOGIC" => LogCategory::BusinessLogic,
            other => return Err(format!("未知的日志分类: {}", other)),
        };
        Ok(category)
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 异常信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// 性能信息 (毫秒 / 字节)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInfo {
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<u64>,
}

/// 一次HTTP交换的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallInfo {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// 响应耗时 (毫秒)
    pub response_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size: Option<usize>,
}

/// 日志条目
///
/// 一条被观测事件的不可变记录。
/// 只能通过 `EventLog` 的记录入口创建,之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// 形如 `log_<毫秒时间戳>_<9位base36>`,尽力唯一
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub category: LogCategory,
    pub message: String,
    /// 记录时的当前页面
    pub page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub session_id: String,
    pub user_agent: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_call: Option<ApiCallInfo>,
}

/// 条目附加信息
///
/// `EventLog::log_with` 的可选负载,默认全部为空。
#[derive(Debug, Clone, Default)]
pub struct EntryDetails {
    pub data: Option<Value>,
    pub error: Option<ErrorInfo>,
    pub performance: Option<PerformanceInfo>,
    pub api_call: Option<ApiCallInfo>,
}

impl EntryDetails {
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_performance(mut self, performance: PerformanceInfo) -> Self {
        self.performance = Some(performance);
        self
    }

    pub fn with_api_call(mut self, api_call: ApiCallInfo) -> Self {
        self.api_call = Some(api_call);
        self
    }
}

/// 会话信息 (只读)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub current_page: String,
    pub log_count: usize,
}

/// 日志存储统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    /// 本会话累计记录的条目数
    pub total_logged: u64,
    /// 当前缓冲区中的条目数
    pub current_logs: usize,
    /// 因容量上限被淘汰的条目数
    pub evicted: u64,
    pub capacity: usize,
    /// 因转发队列已满被丢弃的上报数
    pub forward_dropped: u64,
}
