//! 日志导出
//!
//! - JSON: 完整条目数组,带缩进
//! - CSV: 固定6列,字段按 RFC 4180 规则加引号

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::models::{ExportError, LogEntry};
use crate::utils::time_utils;

/// CSV表头
pub const CSV_HEADER: [&str; 6] = ["Timestamp", "Level", "Category", "Page", "Message", "Data"];

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// 下载时使用的MIME类型
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 导出文件名: `logs_YYYY-MM-DD.<ext>`
pub fn export_filename(format: ExportFormat, date: DateTime<Utc>) -> String {
    format!("logs_{}.{}", time_utils::export_date(date), format.extension())
}

/// 按格式渲染条目
pub fn render(entries: &[LogEntry], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => render_json(entries),
        ExportFormat::Csv => render_csv(entries),
    }
}

pub fn render_json(entries: &[LogEntry]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// CSV导出
///
/// Data 列为附加数据的JSON,没有附加数据时为 `{}`
pub fn render_csv(entries: &[LogEntry]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for entry in entries {
        let data = match &entry.data {
            Some(data) => serde_json::to_string(data)?,
            None => "{}".to_string(),
        };

        writer.write_record([
            time_utils::format_iso_millis(entry.timestamp).as_str(),
            entry.level.as_str(),
            entry.category.as_str(),
            entry.page.as_str(),
            entry.message.as_str(),
            data.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;

    String::from_utf8(bytes).map_err(|err| {
        ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// 将导出内容写入目录,返回文件路径
pub fn write_export(
    dir: &Path,
    format: ExportFormat,
    content: &str,
    date: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(export_filename(format, date));
    std::fs::write(&path, content)?;

    tracing::info!(
        path = %path.display(),
        format = %format,
        bytes = content.len(),
        "日志导出文件已写入"
    );

    Ok(path)
}
