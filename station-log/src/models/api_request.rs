//! REST请求与响应模型
//!
//! 面板各页面通过这两个结构与后端交互,埋点层据此计算请求/响应大小并记录日志。

use std::collections::BTreeMap;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::HttpError;

/// 发往后端的一次请求
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// 相对路径 (如 `/api/tanks`) 或完整URL
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// 查询参数 (JSON对象)
    pub params: Option<Value>,
    /// 请求体 (JSON)
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            params: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, url).with_body(body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// 大写的方法名 (`GET`、`POST` ...)
    pub fn method_name(&self) -> &str {
        self.method.as_str()
    }

    /// 查询参数展开为键值对,字符串值不带引号
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match &self.params {
            Some(Value::Object(map)) => map
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// 后端返回的成功响应 (2xx)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    /// 响应体: JSON解析成功时为对应值,否则为文本,空响应为 Null
    pub body: Value,
}

impl ApiResponse {
    /// 将响应体反序列化为目标类型
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_unquotes_strings() {
        let request = ApiRequest::get("/api/readings")
            .with_params(json!({ "date": "2026-10-17", "tank": 3, "skip": null }));

        let pairs = request.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("date".to_string(), "2026-10-17".to_string()),
                ("tank".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_response_json() {
        #[derive(serde::Deserialize)]
        struct Tank {
            id: u32,
        }

        let response = ApiResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: BTreeMap::new(),
            body: json!([{ "id": 1 }, { "id": 2 }]),
        };

        let tanks: Vec<Tank> = response.json().unwrap();
        assert_eq!(tanks.iter().map(|t| t.id).sum::<u32>(), 3);
        assert!(response.json::<String>().is_err());
    }
}
