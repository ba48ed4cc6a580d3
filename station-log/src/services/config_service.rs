use crate::models::telemetry_config::keys;
use crate::models::{ConfigError, TelemetryConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 配置服务
///
/// 管理遥测配置的持久化,职责单一:
/// - 从 .env 文件加载配置,进程环境变量优先
/// - 保存配置到 .env 文件
/// - 保持其他配置项不变,仅更新遥测相关字段
pub struct ConfigService;

impl ConfigService {
    /// 获取 .env 文件路径
    ///
    /// 查找顺序:
    /// 1. 当前工作目录的 .env
    /// 2. 上层目录的 .env (在子目录中执行的情况)
    pub fn env_file_path() -> Result<PathBuf, ConfigError> {
        let cwd = env::current_dir()?;

        let env_path = cwd.join(".env");
        if env_path.exists() {
            return Ok(env_path);
        }

        if let Some(parent) = cwd.parent() {
            let parent_env = parent.join(".env");
            if parent_env.exists() {
                return Ok(parent_env);
            }
        }

        // 不存在则创建在当前目录
        Ok(env_path)
    }

    /// 读取 .env 文件为键值对
    ///
    /// 引号、转义与注释的处理交给 dotenvy
    pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(vars)
    }

    /// 按 .env 语法输出值
    ///
    /// 只含安全字符的值原样写出,其余值用双引号包裹并转义 `\`、`"` 与 `$`
    fn quote_env_value(value: &str) -> String {
        let is_plain = !value.is_empty()
            && value.chars().all(|c| {
                c.is_ascii_alphanumeric()
                    || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '+' | ',' | '%')
            });
        if is_plain {
            return value.to_string();
        }

        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for c in value.chars() {
            match c {
                '\\' | '"' | '$' => {
                    quoted.push('\\');
                    quoted.push(c);
                }
                '\n' => quoted.push_str("\\n"),
                _ => quoted.push(c),
            }
        }
        quoted.push('"');
        quoted
    }

    /// 将键值对写回 .env 内容
    ///
    /// 保留原有的注释和空行,仅更新指定的配置项,新配置项按键名排序追加
    fn serialize_env_content(
        original_content: &str,
        updated_vars: &HashMap<String, String>,
    ) -> String {
        let mut result = String::new();
        let mut pending_keys = updated_vars.keys().cloned().collect::<Vec<_>>();
        pending_keys.sort();

        for line in original_content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                result.push_str(line);
                result.push('\n');
                continue;
            }

            if let Some((key, _)) = trimmed.split_once('=') {
                let key = key.trim();
                if let Some(new_value) = updated_vars.get(key) {
                    let updated = format!("{}={}\n", key, Self::quote_env_value(new_value));
                    result.push_str(&updated);
                    pending_keys.retain(|k| k != key);
                    continue;
                }
            }

            result.push_str(line);
            result.push('\n');
        }

        for key in pending_keys {
            if let Some(value) = updated_vars.get(&key) {
                result.push_str(&format!("{}={}\n", key, Self::quote_env_value(value)));
            }
        }

        result
    }

    /// 加载遥测配置
    ///
    /// 读取 .env (如果存在),再用进程环境变量覆盖。
    /// 文件不存在时只使用环境变量与默认值。
    pub fn load_telemetry_config() -> Result<TelemetryConfig, ConfigError> {
        let env_path = Self::env_file_path()?;
        Self::load_from_path(&env_path)
    }

    /// 从指定 .env 文件加载遥测配置
    ///
    /// # 错误处理
    /// - 文件不存在时不报错
    /// - 文件格式错误时返回 EnvFile
    /// - 配置项取值错误时返回 InvalidValue / Invalid
    pub fn load_from_path(env_path: &Path) -> Result<TelemetryConfig, ConfigError> {
        let mut vars = if env_path.exists() {
            Self::read_env_file(env_path)?
        } else {
            tracing::info!(
                path = %env_path.display(),
                "配置文件不存在,使用环境变量与默认遥测配置"
            );
            HashMap::new()
        };

        for key in keys::ALL {
            if let Ok(value) = env::var(key) {
                vars.insert(key.to_string(), value);
            }
        }

        let config = TelemetryConfig::from_vars(&vars)?;

        tracing::info!(
            path = %env_path.display(),
            config = %config.summary_for_logging(),
            "已加载遥测配置"
        );

        Ok(config)
    }

    /// 保存遥测配置到 .env 文件
    pub fn save_telemetry_config(config: &TelemetryConfig) -> Result<(), ConfigError> {
        let env_path = Self::env_file_path()?;
        Self::save_to_path(config, &env_path)
    }

    /// 保存遥测配置到指定文件
    ///
    /// 更新策略:
    /// - 保留文件中的注释、空行与无关配置项
    /// - 仅更新遥测相关的配置项
    /// - 配置项不存在则追加到末尾
    pub fn save_to_path(config: &TelemetryConfig, env_path: &Path) -> Result<(), ConfigError> {
        config.validate()?;

        let original_content = if env_path.exists() {
            fs::read_to_string(env_path)?
        } else {
            String::new()
        };

        let new_content = Self::serialize_env_content(&original_content, &config.to_vars());
        fs::write(env_path, new_content)?;

        tracing::info!(
            path = %env_path.display(),
            config = %config.summary_for_logging(),
            "已保存遥测配置"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_env_content_update_existing() {
        let original = r#"# 日志配置
STATION_LOG_MAX_LOGS=1000
APP_ENV=development

# 其他配置
RUST_LOG=info
"#;

        let mut updated = HashMap::new();
        updated.insert("STATION_LOG_MAX_LOGS".to_string(), "500".to_string());
        updated.insert("APP_ENV".to_string(), "production".to_string());

        let result = ConfigService::serialize_env_content(original, &updated);

        assert!(result.contains("STATION_LOG_MAX_LOGS=500"));
        assert!(result.contains("APP_ENV=production"));
        assert!(result.contains("RUST_LOG=info"));
        assert!(result.contains("# 日志配置"));
        assert!(!result.contains("APP_ENV=development"));
    }

    #[test]
    fn test_serialize_env_content_appends_sorted() {
        let original = "RUST_LOG=info\n";

        let mut updated = HashMap::new();
        updated.insert("STATION_LOG_MAX_LOGS".to_string(), "200".to_string());
        updated.insert("API_BASE_URL".to_string(), "http://localhost:8000".to_string());

        let result = ConfigService::serialize_env_content(original, &updated);

        assert_eq!(
            result,
            "RUST_LOG=info\nAPI_BASE_URL=http://localhost:8000\nSTATION_LOG_MAX_LOGS=200\n"
        );
    }

    #[test]
    fn test_quote_env_value() {
        assert_eq!(ConfigService::quote_env_value("production"), "production");
        assert_eq!(ConfigService::quote_env_value(""), "\"\"");
        assert_eq!(
            ConfigService::quote_env_value("Panel (X11) #2"),
            "\"Panel (X11) #2\""
        );
        assert_eq!(
            ConfigService::quote_env_value(r#"say "hi" $HOME \ ok"#),
            r#""say \"hi\" \$HOME \\ ok""#
        );
    }
}
