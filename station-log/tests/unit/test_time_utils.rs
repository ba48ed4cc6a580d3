use chrono::{NaiveDate, TimeZone, Utc};
use station_log::utils::time_utils::{export_date, format_iso_millis, parse_iso};

// ============================================================================
// format_iso_millis 测试
// ============================================================================

#[test]
fn test_format_iso_millis_整秒补零() {
    let dt = Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 45).unwrap();

    assert_eq!(format_iso_millis(dt), "2026-10-17T08:30:45.000Z");
}

#[test]
fn test_format_iso_millis_截断微秒() {
    let dt = NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_micro_opt(8, 30, 45, 123_456)
        .unwrap()
        .and_utc();

    assert_eq!(format_iso_millis(dt), "2026-10-17T08:30:45.123Z");
}

// ============================================================================
// parse_iso 测试
// ============================================================================

#[test]
fn test_parse_iso_往返一致() {
    let dt = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

    let parsed = parse_iso(&format_iso_millis(dt)).unwrap();

    assert_eq!(parsed, dt);
}

#[test]
fn test_parse_iso_时区偏移转换为UTC() {
    let parsed = parse_iso("2026-10-17T00:30:00-05:00").unwrap();

    assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 17, 5, 30, 0).unwrap());
}

#[test]
fn test_parse_iso_忽略首尾空白() {
    assert!(parse_iso("  2026-10-17T08:00:00Z \n").is_ok());
}

#[test]
fn test_parse_iso_缺少时区_失败() {
    assert!(parse_iso("2026-10-17T08:00:00").is_err());
}

#[test]
fn test_parse_iso_空字符串_失败() {
    assert!(parse_iso("").is_err());
}

// ============================================================================
// export_date 测试
// ============================================================================

#[test]
fn test_export_date_格式() {
    let dt = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 59).unwrap();

    assert_eq!(export_date(dt), "2026-03-09");
}
