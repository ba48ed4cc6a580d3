//! 日志查询过滤条件

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::log_entry::{LogCategory, LogEntry, LogLevel};

/// 日志过滤条件
///
/// 所有条件按逻辑与组合,未设置的条件不参与过滤。
/// `LogFilter::default()` 表示不过滤。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// 最低级别 (包含)
    #[serde(default)]
    pub level: Option<LogLevel>,
    /// 分类精确匹配
    #[serde(default)]
    pub category: Option<LogCategory>,
    /// 页面精确匹配
    #[serde(default)]
    pub page: Option<String>,
    /// 起始时间 (包含)
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// 结束时间 (包含)
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// 不区分大小写的关键字,匹配消息、页面与附加数据
    #[serde(default)]
    pub search: Option<String>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_level(level: LogLevel) -> Self {
        Self::default().with_level(level)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_category(mut self, category: LogCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn with_time_range(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// 是否未设置任何条件
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 判断条目是否满足全部条件
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = self.level {
            if entry.level < level {
                return false;
            }
        }

        if let Some(category) = self.category {
            if entry.category != category {
                return false;
            }
        }

        if let Some(page) = &self.page {
            if &entry.page != page {
                return false;
            }
        }

        if let Some(start) = self.start_time {
            if entry.timestamp < start {
                return false;
            }
        }

        if let Some(end) = self.end_time {
            if entry.timestamp > end {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => Self::search_matches(entry, needle),
            _ => true,
        }
    }

    fn search_matches(entry: &LogEntry, needle: &str) -> bool {
        let needle = needle.to_lowercase();

        if entry.message.to_lowercase().contains(&needle)
            || entry.page.to_lowercase().contains(&needle)
        {
            return true;
        }

        entry
            .data
            .as_ref()
            .map(|data| data.to_string().to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}
