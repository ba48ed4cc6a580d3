//! HTTP传输层
//!
//! `HttpTransport` 是埋点装饰器包装的接缝: 真实实现基于 reqwest,
//! 测试中可替换为脚本化的模拟实现。

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use crate::models::{ApiClientConfig, ApiRequest, ApiResponse, HttpError};

const JSON_CONTENT_TYPE: &str = "application/json";

/// 发送一次请求并返回成功响应
///
/// 非2xx状态码必须以 `HttpError::Status` 返回,而不是 `Ok`。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError>;

    /// 传输层为每个请求自动附加的请求头
    fn default_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// 基于 reqwest 的传输实现
///
/// 相对路径按 `ApiClientConfig::base_url` 拼接,默认 `Content-Type: application/json`。
pub struct ReqwestTransport {
    client: Client,
    config: ApiClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: &ApiClientConfig) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        tracing::info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            "HTTP传输层初始化完成"
        );

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn default_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.as_str().to_string(), JSON_CONTENT_TYPE.to_string());
        headers
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        let url = self.config.resolve(&request.url);

        let mut builder = self.client.request(request.method.clone(), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let text = response.text().await?;
        let body = parse_body(&text);

        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                method = %request.method,
                url = %url,
                "后端返回非成功状态码"
            );

            return Err(HttpError::Status {
                status: status.as_u16(),
                status_text,
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}

/// 响应体: 优先按JSON解析,失败时保留原始文本,空响应为 Null
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
