use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// HTTP调用相关错误
///
/// 处理与后端REST API交互时的各种失败场景。
/// 埋点层原样返回此错误,因此它必须可比较、可克隆。
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum HttpError {
    /// 后端返回了非2xx状态码
    ///
    /// 保留状态码与响应体,调用方据此展示后端给出的错误信息
    #[error("HTTP错误 {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: Value,
    },

    /// 请求超时
    ///
    /// 超过 `ApiClientConfig::timeout_ms` 仍未收到响应
    #[error("请求超时: {0}")]
    Timeout(String),

    /// 网络请求失败
    ///
    /// 可能原因:
    /// - 网络连接中断
    /// - 后端服务器不可达
    /// - DNS解析失败
    #[error("网络请求失败: {0}")]
    Network(String),

    /// 响应体解码失败
    #[error("响应数据解析失败: {0}")]
    Decode(String),

    /// 请求构造无效 (URL、请求头等)
    #[error("无效请求: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    /// 错误名称,写入日志条目的 `error.name`
    pub fn name(&self) -> &'static str {
        match self {
            HttpError::Status { .. } => "HttpStatusError",
            HttpError::Timeout(_) => "TimeoutError",
            HttpError::Network(_) => "NetworkError",
            HttpError::Decode(_) => "DecodeError",
            HttpError::InvalidRequest(_) => "InvalidRequestError",
        }
    }

    /// 错误代码,沿用前端常见的HTTP客户端错误码
    pub fn code(&self) -> &'static str {
        match self {
            HttpError::Status { status, .. } if *status >= 500 => "ERR_BAD_RESPONSE",
            HttpError::Status { .. } => "ERR_BAD_REQUEST",
            HttpError::Timeout(_) => "ECONNABORTED",
            HttpError::Network(_) => "ERR_NETWORK",
            HttpError::Decode(_) => "ERR_BAD_RESPONSE",
            HttpError::InvalidRequest(_) => "ERR_BAD_OPTION",
        }
    }

    /// HTTP状态码 (网络层失败时为 None)
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 状态描述 (网络层失败时为 None)
    pub fn status_text(&self) -> Option<&str> {
        match self {
            HttpError::Status { status_text, .. } => Some(status_text),
            _ => None,
        }
    }

    /// 后端返回的响应体 (网络层失败时为 None)
    pub fn body(&self) -> Option<&Value> {
        match self {
            HttpError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// 实现从reqwest::Error到HttpError的转换
impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::Network(format!("无法连接到服务器: {}", err))
        } else if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidRequest(err.to_string())
        } else {
            HttpError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Decode(err.to_string())
    }
}

/// 日志上报相关错误
///
/// 只在转发任务内部出现,永远不会传递给 `EventLog::log` 的调用方。
#[derive(Debug, Error)]
pub enum ForwardError {
    /// 上报请求未能发出或未收到响应
    #[error("日志上报失败: {0}")]
    Transport(String),

    /// 日志接收端拒绝了请求
    #[error("日志接收端返回 {status}")]
    Rejected { status: u16 },

    /// 日志条目序列化失败
    #[error("日志序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        ForwardError::Transport(err.to_string())
    }
}

/// 日志导出相关错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 不支持的导出格式
    #[error("不支持的导出格式: {0} (可选: json, csv)")]
    UnknownFormat(String),

    /// JSON序列化失败
    #[error("导出序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV写入失败
    #[error("CSV生成失败: {0}")]
    Csv(#[from] csv::Error),

    /// 写入导出文件失败
    #[error("导出文件写入失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 遥测配置相关错误
///
/// 每个错误都表达清晰的失败原因,便于诊断配置文件问题。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值无法解析
    #[error("配置项 {key} 的值无效: {value}")]
    InvalidValue { key: String, value: String },

    /// 配置整体校验失败
    #[error("配置无效: {0}")]
    Invalid(String),

    /// .env 文件格式错误
    #[error(".env 文件解析失败: {0}")]
    EnvFile(String),

    /// 读取或写入配置文件时的文件系统错误
    #[error("I/O错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dotenvy::Error> for ConfigError {
    fn from(err: dotenvy::Error) -> Self {
        match err {
            dotenvy::Error::Io(io) => ConfigError::Io(io),
            other => ConfigError::EnvFile(other.to_string()),
        }
    }
}

/// 应用级错误
///
/// 汇总启动与命令执行过程中可能出现的各类错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}
