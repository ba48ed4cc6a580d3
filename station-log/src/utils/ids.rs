//! 标识符生成
//!
//! 日志ID与会话ID: `<前缀>_<毫秒时间戳>_<9位base36随机串>`,尽力唯一,不用于安全场景。
//! 请求关联ID: UUID v4,结构上唯一。

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn prefixed_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

/// 生成日志条目ID
pub fn generate_log_id() -> String {
    prefixed_id("log")
}

/// 生成会话ID
pub fn generate_session_id() -> String {
    prefixed_id("session")
}

/// 生成请求关联ID
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_log_id_format() {
        let id = generate_log_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "log");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_session_id_prefix() {
        assert!(generate_session_id().starts_with("session_"));
    }

    #[test]
    fn test_correlation_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_correlation_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
