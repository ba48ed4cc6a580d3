use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};

/// 自某时刻起经过的毫秒数
///
/// 超出 u64 范围时饱和 (实际不会发生)
pub fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// 格式化为毫秒精度的ISO-8601时间
///
/// 例: 2026-10-17T08:30:45.123Z
pub fn format_iso_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 解析ISO-8601时间字符串 (任意时区),统一转换为UTC
pub fn parse_iso(time_str: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(time_str.trim()).map(|dt| dt.with_timezone(&Utc))
}

/// 导出文件名使用的日期部分
///
/// 输出格式: YYYY-MM-DD
pub fn export_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}
