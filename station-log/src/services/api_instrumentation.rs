//! HTTP请求埋点
//!
//! `InstrumentedClient` 包装任意 `HttpTransport`,对每次调用:
//! 1. 发出前记录 DEBUG 请求条目
//! 2. 成功时记录 INFO 调用摘要与 DEBUG 响应条目
//! 3. 失败时记录 ERROR 条目
//!
//! 调用结果原样返回。关联ID只存在于本次调用的栈上,
//! 调用结束或 future 被丢弃后不留下任何状态。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::models::{ApiRequest, ApiResponse, HttpError, LogCategory, LogLevel};
use crate::services::event_log::EventLog;
use crate::services::http_transport::HttpTransport;
use crate::utils::{ids, time_utils};

/// 带埋点的HTTP客户端
pub struct InstrumentedClient<T> {
    inner: T,
    log: Arc<EventLog>,
}

impl<T: HttpTransport> InstrumentedClient<T> {
    pub fn new(inner: T, log: Arc<EventLog>) -> Self {
        Self { inner, log }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn event_log(&self) -> &Arc<EventLog> {
        &self.log
    }

    pub async fn get(&self, url: &str) -> Result<ApiResponse, HttpError> {
        self.execute(&ApiRequest::get(url)).await
    }

    pub async fn post(&self, url: &str, body: Value) -> Result<ApiResponse, HttpError> {
        self.execute(&ApiRequest::post(url, body)).await
    }

    pub async fn put(&self, url: &str, body: Value) -> Result<ApiResponse, HttpError> {
        self.execute(&ApiRequest::put(url, body)).await
    }

    pub async fn delete(&self, url: &str) -> Result<ApiResponse, HttpError> {
        self.execute(&ApiRequest::delete(url)).await
    }

    /// 实际发出的请求头: 传输层默认值,再由请求自带的同名头 (不区分大小写) 覆盖
    pub fn effective_headers(&self, request: &ApiRequest) -> BTreeMap<String, String> {
        let mut headers = self.inner.default_headers();
        headers.retain(|name, _| {
            !request
                .headers
                .keys()
                .any(|own| own.eq_ignore_ascii_case(name))
        });
        headers.extend(request.headers.clone());
        headers
    }

    /// 发送请求并记录埋点
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        let request_id = ids::generate_correlation_id();
        let request_size = request_size(request);
        let started = Instant::now();
        let method = request.method_name();
        let headers = self.effective_headers(request);

        self.log.log(
            LogLevel::Debug,
            LogCategory::Api,
            format!("API Request: {} {}", method, request.url),
            Some(json!({
                "requestId": request_id,
                "method": method,
                "url": request.url,
                "headers": headers,
                "params": request.params,
                "data": request.body,
                "requestSize": request_size,
            })),
        );

        let result = self.inner.send(request).await;

        match &result {
            Ok(response) => {
                self.record_response(request, &request_id, started, request_size, response)
            }
            Err(err) => self.record_error(request, &request_id, started, request_size, err),
        }

        result
    }

    fn record_response(
        &self,
        request: &ApiRequest,
        request_id: &str,
        started: Instant,
        request_size: usize,
        response: &ApiResponse,
    ) {
        let method = request.method_name();
        let response_size = json_len(&response.body);

        self.log.api_call(
            method,
            &request.url,
            started,
            Some(response.status),
            Some(request_size),
            Some(response_size),
        );

        self.log.log(
            LogLevel::Debug,
            LogCategory::Api,
            format!("API Response: {} {} {}", response.status, method, request.url),
            Some(json!({
                "requestId": request_id,
                "status": response.status,
                "statusText": response.status_text,
                "headers": response.headers,
                "data": response.body,
                "responseTime": time_utils::elapsed_millis(started),
                "requestSize": request_size,
                "responseSize": response_size,
            })),
        );
    }

    fn record_error(
        &self,
        request: &ApiRequest,
        request_id: &str,
        started: Instant,
        request_size: usize,
        err: &HttpError,
    ) {
        let method = request.method_name();
        let status_label = err
            .status()
            .map(|status| status.to_string())
            .unwrap_or_else(|| "NETWORK".to_string());

        self.log.log(
            LogLevel::Error,
            LogCategory::Api,
            format!("API Error: {} {} {}", status_label, method, request.url),
            Some(json!({
                "requestId": request_id,
                "error": {
                    "name": err.name(),
                    "message": err.to_string(),
                    "code": err.code(),
                    "status": err.status(),
                    "statusText": err.status_text(),
                    "data": err.body(),
                },
                "config": {
                    "method": method,
                    "url": request.url,
                    "headers": self.effective_headers(request),
                    "params": request.params,
                    "data": request.body,
                },
                "responseTime": time_utils::elapsed_millis(started),
                "requestSize": request_size,
            })),
        );
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for InstrumentedClient<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        self.execute(request).await
    }

    fn default_headers(&self) -> BTreeMap<String, String> {
        self.inner.default_headers()
    }
}

/// 请求大小 = 请求体JSON长度 + 查询参数JSON长度
pub fn request_size(request: &ApiRequest) -> usize {
    request.body.as_ref().map(json_len).unwrap_or(0)
        + request.params.as_ref().map(json_len).unwrap_or(0)
}

/// 序列化后的JSON长度,序列化失败按0计
pub fn json_len(value: &Value) -> usize {
    serde_json::to_string(value)
        .map(|text| text.len())
        .unwrap_or(0)
}
