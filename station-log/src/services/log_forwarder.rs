//! 日志远程上报
//!
//! 记录路径只做一次非阻塞的 `try_send`,真正的网络I/O在后台任务中完成:
//! - 队列满时丢弃条目并计数,调用方永不阻塞
//! - 上报失败只写进程日志,然后丢弃该条目
//! - 不重试、不退避、不批量

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{ApiClientConfig, ForwardError, LogEntry};

/// 日志接收端
#[async_trait]
pub trait LogSink: Send + Sync + 'static {
    async fn deliver(&self, entry: &LogEntry) -> Result<(), ForwardError>;
}

#[async_trait]
impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    async fn deliver(&self, entry: &LogEntry) -> Result<(), ForwardError> {
        (**self).deliver(entry).await
    }
}

/// 通过HTTP上报到后端日志接口
///
/// 使用独立的 reqwest 客户端,上报请求本身不会被埋点。
pub struct HttpLogSink {
    client: Client,
    endpoint: String,
}

impl HttpLogSink {
    pub fn new(config: &ApiClientConfig) -> Result<Self, ForwardError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            endpoint: config.log_endpoint_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LogSink for HttpLogSink {
    async fn deliver(&self, entry: &LogEntry) -> Result<(), ForwardError> {
        let response = self.client.post(&self.endpoint).json(entry).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// 一次投递的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// 已进入队列
    Queued,
    /// 队列已满,条目被丢弃
    DroppedFull,
    /// 上报任务已停止
    Closed,
}

/// 上报队列的发送端,可克隆
#[derive(Debug, Clone)]
pub struct ForwarderHandle {
    sender: mpsc::Sender<LogEntry>,
    dropped: Arc<AtomicU64>,
}

impl ForwarderHandle {
    /// 尝试投递条目,永不阻塞
    pub fn offer(&self, entry: LogEntry) -> ForwardOutcome {
        match self.sender.try_send(entry) {
            Ok(()) => ForwardOutcome::Queued,
            Err(TrySendError::Full(entry)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    entry_id = %entry.id,
                    total_dropped = dropped,
                    "上报队列已满,丢弃日志条目"
                );
                ForwardOutcome::DroppedFull
            }
            Err(TrySendError::Closed(_)) => ForwardOutcome::Closed,
        }
    }

    /// 因队列满被丢弃的条目数
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// 上报任务结束时的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwarderReport {
    pub delivered: u64,
    pub failed: u64,
}

/// 上报任务
pub struct LogForwarder;

impl LogForwarder {
    /// 创建容量至少为1的上报队列
    pub fn channel(capacity: usize) -> (ForwarderHandle, mpsc::Receiver<LogEntry>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = ForwarderHandle {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (handle, receiver)
    }

    /// 启动后台上报任务
    ///
    /// 任务在取消令牌触发或所有发送端被丢弃后结束。
    /// 取消时仍在队列中的条目被丢弃。
    pub fn spawn<S: LogSink>(
        sink: S,
        capacity: usize,
        cancel: CancellationToken,
    ) -> (ForwarderHandle, JoinHandle<ForwarderReport>) {
        let (handle, receiver) = Self::channel(capacity);

        tracing::info!(capacity = capacity.max(1), "日志上报任务已启动");

        let task = tokio::spawn(Self::run(sink, receiver, cancel));
        (handle, task)
    }

    async fn run<S: LogSink>(
        sink: S,
        mut receiver: mpsc::Receiver<LogEntry>,
        cancel: CancellationToken,
    ) -> ForwarderReport {
        let mut report = ForwarderReport::default();

        loop {
            let entry = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                entry = receiver.recv() => match entry {
                    Some(entry) => entry,
                    None => break,
                },
            };

            match sink.deliver(&entry).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        entry_id = %entry.id,
                        error = %e,
                        "日志条目上报失败"
                    );
                }
            }
        }

        tracing::info!(
            delivered = report.delivered,
            failed = report.failed,
            "日志上报任务已停止"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogCategory, LogLevel};
    use chrono::Utc;

    fn entry(id: &str) -> LogEntry {
        LogEntry {
            id: id.to_string(),
            timestamp: Utc::now(),
            level: LogLevel::Info,
            category: LogCategory::BusinessLogic,
            message: "queued".to_string(),
            page: String::new(),
            user_id: None,
            session_id: "session".to_string(),
            user_agent: "test".to_string(),
            url: "http://localhost/".to_string(),
            data: None,
            error: None,
            performance: None,
            api_call: None,
        }
    }

    #[test]
    fn test_offer_drops_when_full() {
        let (handle, receiver) = LogForwarder::channel(2);

        assert_eq!(handle.offer(entry("a")), ForwardOutcome::Queued);
        assert_eq!(handle.offer(entry("b")), ForwardOutcome::Queued);
        assert_eq!(handle.offer(entry("c")), ForwardOutcome::DroppedFull);
        assert_eq!(handle.dropped_count(), 1);

        drop(receiver);
        assert_eq!(handle.offer(entry("d")), ForwardOutcome::Closed);
        assert_eq!(handle.dropped_count(), 1);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let (handle, _receiver) = LogForwarder::channel(0);
        assert_eq!(handle.offer(entry("a")), ForwardOutcome::Queued);
        assert_eq!(handle.offer(entry("b")), ForwardOutcome::DroppedFull);
    }
}
