use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use station_log::models::{LogCategory, LogEntry, LogFilter, LogLevel};

fn entry(level: LogLevel, category: LogCategory, page: &str, message: &str) -> LogEntry {
    LogEntry {
        id: "log_1760689800000_abcdefghi".to_string(),
        timestamp: Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap(),
        level,
        category,
        message: message.to_string(),
        page: page.to_string(),
        user_id: None,
        session_id: "session_1760689800000_abcdefghi".to_string(),
        user_agent: "station-log/test".to_string(),
        url: "http://localhost:5173/".to_string(),
        data: None,
        error: None,
        performance: None,
        api_call: None,
    }
}

// ============================================================================
// 空过滤条件
// ============================================================================

#[test]
fn test_默认过滤条件_匹配所有条目() {
    let filter = LogFilter::default();

    assert!(filter.is_empty());
    assert!(filter.matches(&entry(LogLevel::Debug, LogCategory::Api, "", "x")));
    assert!(filter.matches(&entry(LogLevel::Critical, LogCategory::Error, "Tanks", "y")));
}

// ============================================================================
// 级别
// ============================================================================

#[test]
fn test_级别过滤_包含边界() {
    let filter = LogFilter::for_level(LogLevel::Warn);

    assert!(!filter.is_empty());
    assert!(!filter.matches(&entry(LogLevel::Info, LogCategory::Api, "", "x")));
    assert!(filter.matches(&entry(LogLevel::Warn, LogCategory::Api, "", "x")));
    assert!(filter.matches(&entry(LogLevel::Critical, LogCategory::Api, "", "x")));
}

// ============================================================================
// 分类与页面
// ============================================================================

#[test]
fn test_分类精确匹配() {
    let filter = LogFilter::new().with_category(LogCategory::Navigation);

    assert!(filter.matches(&entry(LogLevel::Info, LogCategory::Navigation, "", "x")));
    assert!(!filter.matches(&entry(LogLevel::Info, LogCategory::UserAction, "", "x")));
}

#[test]
fn test_页面精确匹配_不做前缀匹配() {
    let filter = LogFilter::new().with_page("Tank");

    assert!(filter.matches(&entry(LogLevel::Info, LogCategory::Api, "Tank", "x")));
    assert!(!filter.matches(&entry(LogLevel::Info, LogCategory::Api, "Tanks", "x")));
}

#[test]
fn test_多个条件_逻辑与() {
    let filter = LogFilter::for_level(LogLevel::Error)
        .with_category(LogCategory::Api)
        .with_page("Prices");

    assert!(filter.matches(&entry(LogLevel::Error, LogCategory::Api, "Prices", "x")));
    assert!(!filter.matches(&entry(LogLevel::Error, LogCategory::Api, "Tanks", "x")));
    assert!(!filter.matches(&entry(LogLevel::Error, LogCategory::Error, "Prices", "x")));
    assert!(!filter.matches(&entry(LogLevel::Warn, LogCategory::Api, "Prices", "x")));
}

// ============================================================================
// 时间范围
// ============================================================================

#[test]
fn test_时间范围_包含边界() {
    let e = entry(LogLevel::Info, LogCategory::Api, "", "x");

    let exact = LogFilter::new().with_time_range(Some(e.timestamp), Some(e.timestamp));
    assert!(exact.matches(&e));

    let later = LogFilter::new().with_time_range(Some(e.timestamp + Duration::milliseconds(1)), None);
    assert!(!later.matches(&e));

    let earlier = LogFilter::new().with_time_range(None, Some(e.timestamp - Duration::milliseconds(1)));
    assert!(!earlier.matches(&e));
}

// ============================================================================
// 关键字搜索
// ============================================================================

#[test]
fn test_关键字_不区分大小写_匹配消息与页面() {
    let e = entry(LogLevel::Info, LogCategory::UserAction, "Readings", "Save All Readings Started");

    assert!(LogFilter::new().with_search("save all").matches(&e));
    assert!(LogFilter::new().with_search("READINGS").matches(&e));
    assert!(!LogFilter::new().with_search("prices").matches(&e));
}

#[test]
fn test_关键字_匹配附加数据() {
    let mut e = entry(LogLevel::Info, LogCategory::Api, "", "API Call: GET /api/tanks");
    e.data = Some(json!({ "tankId": "T-042" }));

    assert!(LogFilter::new().with_search("t-042").matches(&e));
}

// ============================================================================
// 反序列化
// ============================================================================

#[test]
fn test_反序列化_级别为序数() {
    let filter: LogFilter =
        serde_json::from_str(r#"{"level":2,"category":"FORM_SUBMISSION","search":"pump"}"#)
            .unwrap();

    assert_eq!(filter.level, Some(LogLevel::Warn));
    assert_eq!(filter.category, Some(LogCategory::FormSubmission));
    assert_eq!(filter.search.as_deref(), Some("pump"));
    assert!(filter.page.is_none());
}
