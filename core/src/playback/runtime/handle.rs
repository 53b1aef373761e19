use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::playback::error::PlaybackError;
use crate::playback::lifecycle::SessionPhase;
use crate::playback::types::PlaybackRequest;

use super::state::SessionState;

/// 控制器独占的会话句柄，进程句柄只由 worker 持有，从不暴露给调用方。
pub struct PlaybackSessionHandle {
    session_id: u64,
    request: PlaybackRequest,
    state: Arc<SessionState>,
    stop: Arc<Notify>,
    worker: Option<JoinHandle<SessionPhase>>,
}

impl PlaybackSessionHandle {
    pub(super) fn new(
        session_id: u64,
        request: PlaybackRequest,
        state: Arc<SessionState>,
        stop: Arc<Notify>,
        worker: JoinHandle<SessionPhase>,
    ) -> Self {
        Self {
            session_id,
            request,
            state,
            stop,
            worker: Some(worker),
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn request(&self) -> &PlaybackRequest {
        &self.request
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.elapsed()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_running()
    }

    /// 清除运行标记并唤醒 worker 终止渲染阶段；重复调用不会再次发送信号。
    pub(crate) fn request_stop(&self) -> bool {
        if self.state.request_stop() {
            self.stop.notify_one();
            true
        } else {
            false
        }
    }

    /// worker 未走到收尾就退出时由控制器调用；会话已处于终态时返回 `false`。
    pub(crate) fn mark_failed(&self) -> bool {
        self.state.request_stop();
        self.state.transition(SessionPhase::Errored)
    }

    #[cfg(test)]
    pub(crate) fn abort_worker(&self) {
        if let Some(worker) = self.worker.as_ref() {
            worker.abort();
        }
    }

    /// 等待进度 worker 退出并回收所有进程。
    pub(crate) async fn join(&mut self) -> Result<SessionPhase, PlaybackError> {
        match self.worker.take() {
            Some(worker) => worker
                .await
                .map_err(|err| PlaybackError::Worker(err.to_string())),
            None => Ok(self.state.phase()),
        }
    }
}

impl Drop for PlaybackSessionHandle {
    fn drop(&mut self) {
        self.state.request_stop();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
