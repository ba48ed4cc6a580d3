//! 事件日志存储
//!
//! 会话级、有界、只追加的结构化日志缓冲区:
//! - 超出容量时按先进先出淘汰最旧条目
//! - 每条记录镜像到控制台 (tracing),级别对应
//! - 启用上报时把条目投递到转发队列,失败不影响调用方
//! - 支持过滤查询与 JSON/CSV 导出
//!
//! 由调用方显式构造并以 `Arc<EventLog>` 共享,不存在全局单例。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use crate::models::{
    ApiCallInfo, EntryDetails, ExportError, LogCategory, LogEntry, LogFilter, LogLevel, LogStats,
    SessionInfo, TelemetryConfig,
};
use crate::models::telemetry_config::{DEFAULT_APP_URL, DEFAULT_MAX_LOGS};
use crate::services::log_export::{self, ExportFormat};
use crate::services::log_forwarder::ForwarderHandle;
use crate::utils::{ids, time_utils};

/// 控制台镜像使用的 tracing 目标
pub const CONSOLE_TARGET: &str = "station_log::console";

/// 记录时写入条目的上下文
#[derive(Debug, Clone)]
struct PageContext {
    page: String,
    url: String,
    user_id: Option<String>,
}

/// 事件日志
pub struct EventLog {
    session_id: String,
    max_logs: usize,
    user_agent: String,
    entries: Mutex<VecDeque<LogEntry>>,
    context: RwLock<PageContext>,
    forwarder: Option<ForwarderHandle>,
    total_logged: AtomicU64,
    evicted: AtomicU64,
}

impl EventLog {
    /// 创建新的事件日志,生成新的会话ID
    ///
    /// # 参数
    /// - `max_logs`: 最多保留的条目数; 为0时不保留任何条目
    pub fn new(max_logs: usize) -> Self {
        let session_id = ids::generate_session_id();

        tracing::debug!(session_id = %session_id, max_logs, "事件日志已创建");

        Self {
            session_id,
            max_logs,
            user_agent: format!("station-log/{}", env!("CARGO_PKG_VERSION")),
            entries: Mutex::new(VecDeque::with_capacity(max_logs.min(DEFAULT_MAX_LOGS))),
            context: RwLock::new(PageContext {
                page: String::new(),
                url: DEFAULT_APP_URL.to_string(),
                user_id: None,
            }),
            forwarder: None,
            total_logged: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// 按遥测配置创建 (不含转发,转发由 `with_forwarder` 接入)
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(config.max_logs)
            .with_user_agent(config.user_agent.clone())
            .with_location(config.app_url.clone())
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_location(self, url: impl Into<String>) -> Self {
        self.set_location(url);
        self
    }

    /// 接入远程上报队列
    pub fn with_forwarder(mut self, forwarder: ForwarderHandle) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn capacity(&self) -> usize {
        self.max_logs
    }

    fn lock_entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn context(&self) -> PageContext {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_context(&self, update: impl FnOnce(&mut PageContext)) {
        let mut context = self.context.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut context);
    }

    /// 设置当前页面,之后的条目都记录该页面
    pub fn set_current_page(&self, page: impl Into<String>) {
        let page = page.into();
        self.update_context(|context| context.page = page);
    }

    /// 设置当前地址 (条目的 `url` 字段)
    pub fn set_location(&self, url: impl Into<String>) {
        let url = url.into();
        self.update_context(|context| context.url = url);
    }

    /// 设置当前用户,`None` 表示匿名
    pub fn set_user_id(&self, user_id: Option<String>) {
        self.update_context(|context| context.user_id = user_id);
    }

    pub fn current_page(&self) -> String {
        self.context().page
    }

    /// 记录一条日志
    ///
    /// 总是成功: 追加条目,必要时淘汰最旧条目,镜像到控制台,
    /// 启用上报时投递到转发队列。
    pub fn log(
        &self,
        level: LogLevel,
        category: LogCategory,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        let details = EntryDetails {
            data,
            ..EntryDetails::default()
        };
        self.log_with(level, category, message, details);
    }

    /// 记录一条带附加信息 (异常、性能、HTTP摘要) 的日志
    pub fn log_with(
        &self,
        level: LogLevel,
        category: LogCategory,
        message: impl Into<String>,
        details: EntryDetails,
    ) {
        let entry = self.create_entry(level, category, message.into(), details);

        mirror_to_console(&entry);

        let forwarded = self.forwarder.as_ref().map(|_| entry.clone());

        {
            let mut entries = self.lock_entries();
            entries.push_back(entry);
            while entries.len() > self.max_logs {
                entries.pop_front();
                self.evicted.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.total_logged.fetch_add(1, Ordering::Relaxed);

        if let (Some(forwarder), Some(entry)) = (&self.forwarder, forwarded) {
            forwarder.offer(entry);
        }
    }

    fn create_entry(
        &self,
        level: LogLevel,
        category: LogCategory,
        message: String,
        details: EntryDetails,
    ) -> LogEntry {
        let context = self.context();

        LogEntry {
            id: ids::generate_log_id(),
            timestamp: Utc::now(),
            level,
            category,
            message,
            page: context.page,
            user_id: context.user_id,
            session_id: self.session_id.clone(),
            user_agent: self.user_agent.clone(),
            url: context.url,
            data: details.data,
            error: details.error,
            performance: details.performance,
            api_call: details.api_call,
        }
    }

    pub fn debug(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Debug, LogCategory::BusinessLogic, message, data);
    }

    pub fn info(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Info, LogCategory::BusinessLogic, message, data);
    }

    pub fn warn(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Warn, LogCategory::BusinessLogic, message, data);
    }

    pub fn error(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Error, LogCategory::Error, message, data);
    }

    pub fn critical(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Critical, LogCategory::Error, message, data);
    }

    /// 记录一次HTTP调用摘要
    ///
    /// 响应耗时 = 当前时间 - `started`
    pub fn api_call(
        &self,
        method: &str,
        url: &str,
        started: Instant,
        status: Option<u16>,
        request_size: Option<usize>,
        response_size: Option<usize>,
    ) {
        let api_call = ApiCallInfo {
            method: method.to_string(),
            url: url.to_string(),
            status,
            response_time: time_utils::elapsed_millis(started),
            request_size,
            response_size,
        };

        self.log_with(
            LogLevel::Info,
            LogCategory::Api,
            format!("API Call: {} {}", method, url),
            EntryDetails::default().with_api_call(api_call),
        );
    }

    pub fn user_action(&self, action: &str, data: Option<Value>) {
        self.log(
            LogLevel::Info,
            LogCategory::UserAction,
            format!("User Action: {}", action),
            data,
        );
    }

    /// 记录表单提交结果,失败时为ERROR级别
    pub fn form_submission(&self, form_name: &str, success: bool, data: Option<Value>) {
        let (level, outcome) = if success {
            (LogLevel::Info, "Success")
        } else {
            (LogLevel::Error, "Failed")
        };

        self.log(
            level,
            LogCategory::FormSubmission,
            format!("Form Submission: {} - {}", form_name, outcome),
            data,
        );
    }

    pub fn navigation(&self, from: &str, to: &str) {
        self.log(
            LogLevel::Info,
            LogCategory::Navigation,
            format!("Navigation: {} → {}", from, to),
            None,
        );
    }

    /// 查询日志
    ///
    /// 返回满足过滤条件的条目快照,按时间戳从新到旧排序;
    /// 时间戳相同时后写入的在前。
    pub fn get_logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        let mut matched: Vec<LogEntry> = {
            let entries = self.lock_entries();
            entries
                .iter()
                .rev()
                .filter(|entry| filter.matches(entry))
                .cloned()
                .collect()
        };

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched
    }

    /// 全部日志 (不过滤)
    pub fn all_logs(&self) -> Vec<LogEntry> {
        self.get_logs(&LogFilter::default())
    }

    /// 导出全部日志
    pub fn export_logs(&self, format: ExportFormat) -> Result<String, ExportError> {
        let entries = self.all_logs();
        log_export::render(&entries, format)
    }

    /// 清空缓冲区,会话ID保持不变
    pub fn clear_logs(&self) {
        let cleared = {
            let mut entries = self.lock_entries();
            let count = entries.len();
            entries.clear();
            count
        };

        tracing::info!(
            session_id = %self.session_id,
            cleared,
            "事件日志已清空"
        );
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            current_page: self.current_page(),
            log_count: self.lock_entries().len(),
        }
    }

    pub fn stats(&self) -> LogStats {
        LogStats {
            total_logged: self.total_logged.load(Ordering::Relaxed),
            current_logs: self.lock_entries().len(),
            evicted: self.evicted.load(Ordering::Relaxed),
            capacity: self.max_logs,
            forward_dropped: self
                .forwarder
                .as_ref()
                .map(ForwarderHandle::dropped_count)
                .unwrap_or(0),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOGS)
    }
}

/// 按级别镜像到控制台,CRITICAL 与 ERROR 共用错误通道
fn mirror_to_console(entry: &LogEntry) {
    let data = entry.data.as_ref().map(Value::to_string);
    let data = data.as_deref().unwrap_or("-");
    let line = format!("[{}] {}", entry.category, entry.message);

    match entry.level {
        LogLevel::Debug => tracing::debug!(
            target: CONSOLE_TARGET,
            category = %entry.category,
            page = %entry.page,
            data = %data,
            "{}",
            line
        ),
        LogLevel::Info => tracing::info!(
            target: CONSOLE_TARGET,
            category = %entry.category,
            page = %entry.page,
            data = %data,
            "{}",
            line
        ),
        LogLevel::Warn => tracing::warn!(
            target: CONSOLE_TARGET,
            category = %entry.category,
            page = %entry.page,
            data = %data,
            "{}",
            line
        ),
        LogLevel::Error | LogLevel::Critical => tracing::error!(
            target: CONSOLE_TARGET,
            category = %entry.category,
            page = %entry.page,
            severity = %entry.level,
            data = %data,
            "{}",
            line
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_carries_context() {
        let log = EventLog::new(10).with_user_agent("test-agent");
        log.set_current_page("Tanks");
        log.set_location("http://localhost:5173/tanks");
        log.set_user_id(Some("operator-7".to_string()));

        log.info("Tanks loaded", Some(json!({ "count": 4 })));

        let entries = log.all_logs();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.page, "Tanks");
        assert_eq!(entry.url, "http://localhost:5173/tanks");
        assert_eq!(entry.user_agent, "test-agent");
        assert_eq!(entry.user_id.as_deref(), Some("operator-7"));
        assert_eq!(entry.session_id, log.session_id());
        assert_eq!(entry.category, LogCategory::BusinessLogic);
        assert_eq!(entry.data, Some(json!({ "count": 4 })));
    }

    #[test]
    fn test_convenience_levels_and_categories() {
        let log = EventLog::new(20);
        log.debug("d", None);
        log.warn("w", None);
        log.critical("c", None);
        log.user_action("Save All Readings Started", None);
        log.form_submission("Readings", false, None);
        log.navigation("Dashboard", "Tanks");

        let entries = log.all_logs();
        let find = |message: &str| {
            entries
                .iter()
                .find(|e| e.message == message)
                .cloned()
                .unwrap()
        };

        assert_eq!(find("d").level, LogLevel::Debug);
        assert_eq!(find("w").category, LogCategory::BusinessLogic);
        assert_eq!(find("c").category, LogCategory::Error);
        assert_eq!(
            find("User Action: Save All Readings Started").category,
            LogCategory::UserAction
        );
        assert_eq!(find("Form Submission: Readings - Failed").level, LogLevel::Error);
        assert_eq!(
            find("Navigation: Dashboard → Tanks").category,
            LogCategory::Navigation
        );
    }

    #[test]
    fn test_api_call_populates_summary() {
        let log = EventLog::new(5);
        log.api_call("GET", "/api/prices", Instant::now(), Some(200), Some(0), Some(128));

        let entry = log.all_logs().remove(0);
        assert_eq!(entry.message, "API Call: GET /api/prices");
        assert_eq!(entry.category, LogCategory::Api);
        let api_call = entry.api_call.unwrap();
        assert_eq!(api_call.status, Some(200));
        assert_eq!(api_call.response_size, Some(128));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let log = EventLog::new(0);
        log.info("dropped immediately", None);

        assert!(log.all_logs().is_empty());
        let stats = log.stats();
        assert_eq!(stats.total_logged, 1);
        assert_eq!(stats.evicted, 1);
    }
}
