//! 日志查看与提交命令
//!
//! 日志查看页与各业务页面调用的入口。
//! 与其他命令一致: 参数和返回值可序列化,错误以字符串返回。

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{ClientLogEvent, LogCategory, LogEntry, LogFilter, LogLevel, LogStats, SessionInfo};
use crate::services::log_export::{self, ExportFormat};
use crate::state::AppState;
use crate::utils::time_utils;

/// 日志查询参数
///
/// 时间为ISO-8601字符串; 未指定级别时使用配置的默认查看级别
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub category: Option<LogCategory>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// 导出结果,供页面触发下载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogExport {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

fn parse_time(field: &str, value: Option<&str>) -> Result<Option<chrono::DateTime<Utc>>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => time_utils::parse_iso(raw)
            .map(Some)
            .map_err(|e| format!("{} 时间格式无效: {} ({})", field, raw, e)),
    }
}

/// 查询日志
///
/// 结果按时间从新到旧排序
pub async fn get_logs(state: &AppState, query: LogQuery) -> Result<Vec<LogEntry>, String> {
    let filter = LogFilter {
        level: Some(query.level.unwrap_or(state.config.default_filter_level)),
        category: query.category,
        page: query.page.filter(|page| !page.is_empty()),
        start_time: parse_time("startTime", query.start_time.as_deref())?,
        end_time: parse_time("endTime", query.end_time.as_deref())?,
        search: query.search,
    };

    let logs = state.event_log.get_logs(&filter);

    tracing::debug!(
        level = ?filter.level,
        category = ?filter.category,
        matched = logs.len(),
        "已查询日志"
    );

    Ok(logs)
}

/// 导出全部日志
///
/// # 参数
/// - `format`: `json` 或 `csv`
pub async fn export_logs(state: &AppState, format: String) -> Result<LogExport, String> {
    let format: ExportFormat = format.parse().map_err(|e| format!("{}", e))?;

    let content = state
        .event_log
        .export_logs(format)
        .map_err(|e| format!("导出日志失败: {}", e))?;

    Ok(LogExport {
        filename: log_export::export_filename(format, Utc::now()),
        mime_type: format.mime_type().to_string(),
        content,
    })
}

/// 导出全部日志并写入文件
///
/// 未指定目录时写入用户下载目录,无法确定时写入当前目录
pub async fn save_log_export(
    state: &AppState,
    format: String,
    dir: Option<PathBuf>,
) -> Result<PathBuf, String> {
    let format: ExportFormat = format.parse().map_err(|e| format!("{}", e))?;

    let dir = dir
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let content = state
        .event_log
        .export_logs(format)
        .map_err(|e| format!("导出日志失败: {}", e))?;

    log_export::write_export(&dir, format, &content, Utc::now())
        .map_err(|e| format!("保存导出文件失败: {}", e))
}

/// 清空日志,会话ID不变
pub async fn clear_logs(state: &AppState) -> Result<(), String> {
    state.event_log.clear_logs();
    Ok(())
}

pub async fn get_session_info(state: &AppState) -> Result<SessionInfo, String> {
    Ok(state.event_log.session_info())
}

pub async fn get_log_stats(state: &AppState) -> Result<LogStats, String> {
    Ok(state.event_log.stats())
}

/// 页面切换时调用
pub async fn set_current_page(state: &AppState, page: String) -> Result<(), String> {
    state.event_log.set_current_page(page);
    Ok(())
}

/// 记录页面提交的单条日志事件
///
/// 事件带有页面名时先更新当前页面
pub async fn record_client_event(state: &AppState, event: ClientLogEvent) -> Result<(), String> {
    if let Some(page) = event.page.filter(|page| !page.is_empty()) {
        state.event_log.set_current_page(page);
    }

    state
        .event_log
        .log(event.level, event.category, event.message, event.data);

    Ok(())
}

/// 批量记录页面日志
///
/// 每条事件独立处理
pub async fn record_client_batch(
    state: &AppState,
    events: Vec<ClientLogEvent>,
) -> Result<usize, String> {
    let count = events.len();
    for event in events {
        record_client_event(state, event).await?;
    }
    Ok(count)
}
