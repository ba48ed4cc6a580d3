//! 测试公共模块
//!
//! 提供Mock传输层与Mock日志接收端,避免测试依赖真实后端。

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use station_log::models::{ApiRequest, ApiResponse, ForwardError, HttpError, LogEntry};
use station_log::services::{HttpTransport, LogSink};
use tokio::sync::Mutex;

/// Mock传输层
///
/// 按顺序返回预设结果,并记录收到的请求
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<ApiResponse, HttpError>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 预设一个成功响应
    pub async fn respond_ok(&self, status: u16, body: Value) {
        self.responses.lock().await.push_back(Ok(ok_response(status, body)));
    }

    /// 预设一个失败结果
    pub async fn respond_err(&self, err: HttpError) {
        self.responses.lock().await.push_back(Err(err));
    }

    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        self.requests.lock().await.push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::Network("no scripted response".to_string())))
    }
}

pub fn ok_response(status: u16, body: Value) -> ApiResponse {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());

    ApiResponse {
        status,
        status_text: "OK".to_string(),
        headers,
        body,
    }
}

/// 记录所有收到条目的接收端
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<LogEntry>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn delivered(&self) -> Vec<LogEntry> {
        self.delivered.lock().await.clone()
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    async fn deliver(&self, entry: &LogEntry) -> Result<(), ForwardError> {
        self.delivered.lock().await.push(entry.clone());
        Ok(())
    }
}

/// 总是失败的接收端
pub struct FailingSink;

#[async_trait]
impl LogSink for FailingSink {
    async fn deliver(&self, _entry: &LogEntry) -> Result<(), ForwardError> {
        Err(ForwardError::Rejected { status: 503 })
    }
}
