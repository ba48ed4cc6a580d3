use crate::models::{AppError, TelemetryConfig};
use crate::services::{
    EventLog, ForwarderReport, HttpLogSink, InstrumentedClient, LogForwarder, ReqwestTransport,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 后台上报任务
struct ForwarderTask {
    cancel: CancellationToken,
    handle: JoinHandle<ForwarderReport>,
}

/// 应用全局状态
///
/// 每个字段代表日志能力的单一来源:
/// - event_log: 本会话的事件日志
/// - api: 带埋点的后端客户端,所有页面都通过它访问后端
/// - config: 启动时加载的遥测配置
pub struct AppState {
    /// 事件日志: 所有埋点的唯一写入目标
    pub event_log: Arc<EventLog>,

    /// 后端客户端: 每次请求都会被记录
    pub api: Arc<InstrumentedClient<ReqwestTransport>>,

    pub config: TelemetryConfig,

    forwarder: Option<ForwarderTask>,
}

impl AppState {
    /// 初始化应用状态
    ///
    /// 启用上报时会启动后台任务,因此必须在 tokio 运行时内调用。
    ///
    /// # 错误处理
    /// 配置无效或HTTP客户端构建失败时返回错误
    pub fn new(config: TelemetryConfig) -> Result<Self, AppError> {
        config.validate()?;

        let mut event_log = EventLog::from_config(&config);

        let forwarder = if config.forwarding_enabled {
            let sink = HttpLogSink::new(&config.api)?;
            let cancel = CancellationToken::new();
            let (sender, handle) =
                LogForwarder::spawn(sink, config.forward_queue_capacity, cancel.clone());
            event_log = event_log.with_forwarder(sender);
            Some(ForwarderTask { cancel, handle })
        } else {
            None
        };

        let event_log = Arc::new(event_log);
        let transport = ReqwestTransport::new(&config.api)?;
        let api = Arc::new(InstrumentedClient::new(transport, Arc::clone(&event_log)));

        tracing::info!(
            session_id = %event_log.session_id(),
            config = %config.summary_for_logging(),
            "应用状态初始化完成"
        );

        Ok(Self {
            event_log,
            api,
            config,
            forwarder,
        })
    }

    pub fn forwarding_active(&self) -> bool {
        self.forwarder.is_some()
    }

    /// 停止上报任务并等待其结束
    ///
    /// 未启用上报时返回 None
    pub async fn shutdown(self) -> Option<ForwarderReport> {
        let task = self.forwarder?;
        task.cancel.cancel();

        match task.handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "日志上报任务异常退出");
                None
            }
        }
    }
}
