use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::log_entry::LogLevel;

/// 配置项名称
pub mod keys {
    pub const MAX_LOGS: &str = "STATION_LOG_MAX_LOGS";
    pub const APP_ENV: &str = "APP_ENV";
    pub const FORWARDING: &str = "STATION_LOG_FORWARDING";
    pub const QUEUE_CAPACITY: &str = "STATION_LOG_QUEUE_CAPACITY";
    pub const VIEW_LEVEL: &str = "STATION_LOG_VIEW_LEVEL";
    pub const API_BASE_URL: &str = "API_BASE_URL";
    pub const API_TIMEOUT_MS: &str = "API_TIMEOUT_MS";
    pub const LOG_ENDPOINT: &str = "STATION_LOG_ENDPOINT";
    pub const APP_URL: &str = "APP_URL";
    pub const USER_AGENT: &str = "STATION_USER_AGENT";

    /// 全部受管理的配置项
    pub const ALL: [&str; 10] = [
        MAX_LOGS,
        APP_ENV,
        FORWARDING,
        QUEUE_CAPACITY,
        VIEW_LEVEL,
        API_BASE_URL,
        API_TIMEOUT_MS,
        LOG_ENDPOINT,
        APP_URL,
        USER_AGENT,
    ];
}

pub const DEFAULT_MAX_LOGS: usize = 1000;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_API_BASE_URL: &str = "https://fuel-station-backend.onrender.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOG_ENDPOINT: &str = "/api/logs";
pub const DEFAULT_APP_URL: &str = "http://localhost:5173/";

/// 运行环境
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
}

impl FromStr for RuntimeEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeEnvironment::Development),
            "production" | "prod" => Ok(RuntimeEnvironment::Production),
            other => Err(format!("未知的运行环境: {}", other)),
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnvironment::Development => f.write_str("development"),
            RuntimeEnvironment::Production => f.write_str("production"),
        }
    }
}

/// 后端REST客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiClientConfig {
    /// 后端根地址,不含末尾斜杠
    pub base_url: String,
    /// 请求超时 (毫秒)
    pub timeout_ms: u64,
    /// 日志接收端路径
    pub log_endpoint: String,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_endpoint: DEFAULT_LOG_ENDPOINT.to_string(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 拼接完整URL; 已是绝对地址的保持不变
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 日志上报的完整地址
    pub fn log_endpoint_url(&self) -> String {
        self.resolve(&self.log_endpoint)
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

/// 遥测配置
///
/// 事件日志容量、远程上报开关与后端地址。
/// 远程上报由显式开关控制,不再嗅探运行环境。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// 内存中最多保留的条目数
    pub max_logs: usize,
    pub environment: RuntimeEnvironment,
    /// 是否把每条日志上报到 `/api/logs`
    pub forwarding_enabled: bool,
    /// 上报队列容量,满时丢弃新条目
    pub forward_queue_capacity: usize,
    /// 日志面板未指定级别时的默认过滤级别
    pub default_filter_level: LogLevel,
    pub api: ApiClientConfig,
    /// 写入条目 `url` 字段的应用地址
    pub app_url: String,
    /// 写入条目 `userAgent` 字段
    pub user_agent: String,
}

impl TelemetryConfig {
    pub fn new(api: ApiClientConfig) -> Self {
        Self {
            api,
            ..Self::default()
        }
    }

    pub fn with_max_logs(mut self, max_logs: usize) -> Self {
        self.max_logs = max_logs;
        self
    }

    /// 设置运行环境,同时把上报开关重置为该环境的默认值
    pub fn with_environment(mut self, environment: RuntimeEnvironment) -> Self {
        self.environment = environment;
        self.forwarding_enabled = environment == RuntimeEnvironment::Production;
        self
    }

    pub fn with_forwarding(mut self, enabled: bool) -> Self {
        self.forwarding_enabled = enabled;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.forward_queue_capacity = capacity;
        self
    }

    pub fn with_default_filter_level(mut self, level: LogLevel) -> Self {
        self.default_filter_level = level;
        self
    }

    pub fn with_app_url(mut self, app_url: impl Into<String>) -> Self {
        self.app_url = app_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// 从键值对构建配置,缺失的键使用默认值
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = vars.get(keys::MAX_LOGS) {
            config.max_logs = parse_value(keys::MAX_LOGS, value)?;
        }

        if let Some(value) = vars.get(keys::APP_ENV) {
            let environment = value.parse().map_err(|_| invalid(keys::APP_ENV, value))?;
            config = config.with_environment(environment);
        }

        if let Some(value) = vars.get(keys::FORWARDING) {
            config.forwarding_enabled = parse_bool(keys::FORWARDING, value)?;
        }

        if let Some(value) = vars.get(keys::QUEUE_CAPACITY) {
            config.forward_queue_capacity = parse_value(keys::QUEUE_CAPACITY, value)?;
        }

        if let Some(value) = vars.get(keys::VIEW_LEVEL) {
            config.default_filter_level =
                value.parse().map_err(|_| invalid(keys::VIEW_LEVEL, value))?;
        }

        if let Some(value) = vars.get(keys::API_BASE_URL) {
            let timeout_ms = config.api.timeout_ms;
            let log_endpoint = config.api.log_endpoint.clone();
            config.api = ApiClientConfig::new(value.as_str()).with_timeout_ms(timeout_ms);
            config.api.log_endpoint = log_endpoint;
        }

        if let Some(value) = vars.get(keys::API_TIMEOUT_MS) {
            config.api.timeout_ms = parse_value(keys::API_TIMEOUT_MS, value)?;
        }

        if let Some(value) = vars.get(keys::LOG_ENDPOINT) {
            config.api.log_endpoint = value.clone();
        }

        if let Some(value) = vars.get(keys::APP_URL) {
            config.app_url = value.clone();
        }

        if let Some(value) = vars.get(keys::USER_AGENT) {
            config.user_agent = value.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// 序列化为键值对,供写回 .env 使用
    pub fn to_vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert(keys::MAX_LOGS.to_string(), self.max_logs.to_string());
        vars.insert(keys::APP_ENV.to_string(), self.environment.to_string());
        vars.insert(keys::FORWARDING.to_string(), self.forwarding_enabled.to_string());
        vars.insert(
            keys::QUEUE_CAPACITY.to_string(),
            self.forward_queue_capacity.to_string(),
        );
        vars.insert(
            keys::VIEW_LEVEL.to_string(),
            self.default_filter_level.as_str().to_ascii_lowercase(),
        );
        vars.insert(keys::API_BASE_URL.to_string(), self.api.base_url.clone());
        vars.insert(keys::API_TIMEOUT_MS.to_string(), self.api.timeout_ms.to_string());
        vars.insert(keys::LOG_ENDPOINT.to_string(), self.api.log_endpoint.clone());
        vars.insert(keys::APP_URL.to_string(), self.app_url.clone());
        vars.insert(keys::USER_AGENT.to_string(), self.user_agent.clone());
        vars
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_logs == 0 {
            return Err(ConfigError::Invalid("max_logs 必须大于0".to_string()));
        }
        if self.forward_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "forward_queue_capacity 必须大于0".to_string(),
            ));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms 必须大于0".to_string()));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "后端地址必须以 http:// 或 https:// 开头: {}",
                self.api.base_url
            )));
        }
        if !self.api.log_endpoint.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "日志接收端路径必须以 / 开头: {}",
                self.api.log_endpoint
            )));
        }
        Ok(())
    }

    /// 获取配置摘要 (用于日志)
    pub fn summary_for_logging(&self) -> String {
        format!(
            "{} max_logs={} forwarding={} api={}",
            self.environment,
            self.max_logs,
            if self.forwarding_enabled { "on" } else { "off" },
            self.api.base_url
        )
    }
}

impl Default for TelemetryConfig {
    /// 默认配置: 开发环境,1000条,不上报
    fn default() -> Self {
        Self {
            max_logs: DEFAULT_MAX_LOGS,
            environment: RuntimeEnvironment::Development,
            forwarding_enabled: false,
            forward_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            default_filter_level: LogLevel::Debug,
            api: ApiClientConfig::default(),
            app_url: DEFAULT_APP_URL.to_string(),
            user_agent: format!("station-log/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.max_logs, 1000);
        assert_eq!(config.environment, RuntimeEnvironment::Development);
        assert!(!config.forwarding_enabled);
        assert_eq!(config.default_filter_level, LogLevel::Debug);
        assert_eq!(config.api.timeout_ms, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_enables_forwarding_by_default() {
        let config = TelemetryConfig::from_vars(&vars(&[("APP_ENV", "production")])).unwrap();
        assert!(config.forwarding_enabled);

        let config = TelemetryConfig::from_vars(&vars(&[
            ("APP_ENV", "production"),
            ("STATION_LOG_FORWARDING", "false"),
        ]))
        .unwrap();
        assert!(!config.forwarding_enabled);
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = TelemetryConfig::from_vars(&vars(&[
            ("STATION_LOG_MAX_LOGS", "50"),
            ("API_BASE_URL", "http://127.0.0.1:8000/"),
            ("API_TIMEOUT_MS", "2500"),
            ("STATION_LOG_VIEW_LEVEL", "warn"),
        ]))
        .unwrap();

        assert_eq!(config.max_logs, 50);
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_ms, 2500);
        assert_eq!(config.default_filter_level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = TelemetryConfig::from_vars(&vars(&[("STATION_LOG_MAX_LOGS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = TelemetryConfig::from_vars(&vars(&[("STATION_LOG_MAX_LOGS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = TelemetryConfig::from_vars(&vars(&[("API_BASE_URL", "ftp://backend")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_vars_roundtrip() {
        let config = TelemetryConfig::default()
            .with_max_logs(42)
            .with_environment(RuntimeEnvironment::Production)
            .with_default_filter_level(LogLevel::Error);

        let parsed = TelemetryConfig::from_vars(&config.to_vars()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_resolve_paths() {
        let api = ApiClientConfig::new("https://backend.example.com/");
        assert_eq!(api.resolve("/api/tanks"), "https://backend.example.com/api/tanks");
        assert_eq!(api.resolve("api/tanks"), "https://backend.example.com/api/tanks");
        assert_eq!(api.resolve("http://other/x"), "http://other/x");
        assert_eq!(api.log_endpoint_url(), "https://backend.example.com/api/logs");
    }
}
