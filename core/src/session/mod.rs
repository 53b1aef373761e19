//! 会话管理：UI 线程唯一需要接触的入口，串联搜索网关与播放控制器。

pub mod events;

pub use events::{PlayerEvent, PlayerEvents, SearchEvent};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::playback::{
    PauseOutcome, PlaybackConfig, PlaybackController, PlaybackError, PlaybackRequest,
    SessionPhase,
};
use crate::search::{SearchGateway, SearchResult};

/// 播放状态快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub session_id: Option<u64>,
    pub phase: SessionPhase,
    pub elapsed: Duration,
    pub title: Option<String>,
}

pub struct SessionManager {
    gateway: Arc<SearchGateway>,
    controller: Mutex<PlaybackController>,
    search_tx: mpsc::UnboundedSender<SearchEvent>,
    next_search_id: AtomicU64,
}

impl SessionManager {
    pub fn new(config: AppConfig) -> (Self, PlayerEvents) {
        let gateway = SearchGateway::new(config.search);
        Self::from_parts(gateway, config.playback)
    }

    pub fn from_parts(gateway: SearchGateway, playback: PlaybackConfig) -> (Self, PlayerEvents) {
        let (search_tx, search_rx) = mpsc::unbounded_channel();
        let (controller, playback_rx) = PlaybackController::new(playback);

        let manager = Self {
            gateway: Arc::new(gateway),
            controller: Mutex::new(controller),
            search_tx,
            next_search_id: AtomicU64::new(0),
        };

        (manager, PlayerEvents::new(search_rx, playback_rx))
    }

    /// 在后台任务中执行搜索，结果通过 `PlayerEvents` 投递；返回本次请求编号。
    pub fn search(&self, query: &str) -> u64 {
        let request_id = self.next_search_id.fetch_add(1, Ordering::SeqCst) + 1;
        let gateway = Arc::clone(&self.gateway);
        let search_tx = self.search_tx.clone();
        let query = query.to_string();
        let limit = gateway.default_limit();

        info!(target: "session_manager", request_id, limit, "dispatching search");

        tokio::spawn(async move {
            let event = match gateway.search(&query, limit).await {
                Ok(results) => SearchEvent::Completed {
                    request_id,
                    query,
                    results,
                },
                Err(error) => SearchEvent::Failed {
                    request_id,
                    query,
                    error,
                },
            };

            if search_tx.send(event).is_err() {
                debug!(
                    target: "session_manager",
                    request_id,
                    "search result dropped; event receiver closed"
                );
            }
        });

        request_id
    }

    pub async fn play(&self, result: &SearchResult) -> Result<u64, PlaybackError> {
        self.play_request(PlaybackRequest::from(result)).await
    }

    pub async fn play_request(&self, request: PlaybackRequest) -> Result<u64, PlaybackError> {
        self.controller.lock().await.start(request).await
    }

    pub async fn stop(&self) -> bool {
        self.controller.lock().await.stop().await
    }

    pub async fn pause_toggle(&self) -> PauseOutcome {
        self.controller.lock().await.pause_toggle().await
    }

    pub async fn status(&self) -> PlaybackStatus {
        let controller = self.controller.lock().await;
        PlaybackStatus {
            session_id: controller.current_session_id(),
            phase: controller.phase(),
            elapsed: controller.elapsed(),
            title: controller.current_request().map(|request| request.title.clone()),
        }
    }

    /// 关闭前调用：停止当前会话并等待所有子进程退出。
    pub async fn shutdown(&self) {
        info!(target: "session_manager", "shutting down");
        self.controller.lock().await.shutdown().await;
    }
}
