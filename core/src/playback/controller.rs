use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::playback::config::PlaybackConfig;
use crate::playback::error::PlaybackError;
use crate::playback::lifecycle::SessionPhase;
use crate::playback::runtime::{self, PlaybackSessionHandle};
use crate::playback::types::{
    NoticeLevel, PauseOutcome, PlaybackRequest, PlaybackUpdate, SessionNotice, UpdatePayload,
};

/// 播放会话控制器：任意时刻最多只有一个存活的会话。
pub struct PlaybackController {
    config: PlaybackConfig,
    updates_tx: mpsc::UnboundedSender<PlaybackUpdate>,
    next_session_id: u64,
    current: Option<PlaybackSessionHandle>,
    last_phase: SessionPhase,
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> (Self, mpsc::UnboundedReceiver<PlaybackUpdate>) {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        (Self::with_sender(config, updates_tx), updates_rx)
    }

    pub fn with_sender(
        config: PlaybackConfig,
        updates_tx: mpsc::UnboundedSender<PlaybackUpdate>,
    ) -> Self {
        Self {
            config,
            updates_tx,
            next_session_id: 0,
            current: None,
            last_phase: SessionPhase::Idle,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// 停止旧会话并等待其进程全部退出，然后启动新的管线，返回新会话编号。
    pub async fn start(&mut self, request: PlaybackRequest) -> Result<u64, PlaybackError> {
        if request.source_reference.trim().is_empty() {
            return Err(PlaybackError::EmptyReference);
        }

        if self.stop().await {
            info!(
                target: "playback_controller",
                "previous session stopped before starting a new one"
            );
        }

        self.next_session_id += 1;
        let session_id = self.next_session_id;

        info!(
            target: "playback_controller",
            session_id,
            title = %request.title,
            "starting playback session"
        );

        match runtime::spawn_session(session_id, &self.config, request, self.updates_tx.clone()) {
            Ok(handle) => {
                self.last_phase = handle.phase();
                self.current = Some(handle);
                Ok(session_id)
            }
            Err(err) => {
                error!(
                    target: "playback_controller",
                    session_id,
                    %err,
                    "failed to start playback session"
                );
                self.last_phase = SessionPhase::Errored;
                self.emit(session_id, UpdatePayload::Errored(err.to_string()));
                Err(err)
            }
        }
    }

    /// 任何阶段都可以调用；只有真正停下了一个运行中的会话时返回 `true`。
    pub async fn stop(&mut self) -> bool {
        let Some(mut handle) = self.current.take() else {
            return false;
        };

        let signalled = handle.request_stop();
        if signalled {
            info!(
                target: "playback_controller",
                session_id = handle.session_id(),
                "stop requested"
            );
        }

        self.last_phase = match handle.join().await {
            Ok(phase) => phase,
            Err(err) => {
                warn!(
                    target: "playback_controller",
                    session_id = handle.session_id(),
                    %err,
                    "progress worker did not shut down cleanly"
                );
                if handle.mark_failed() {
                    self.emit(handle.session_id(), UpdatePayload::Errored(err.to_string()));
                }
                SessionPhase::Errored
            }
        };

        signalled
    }

    /// 暂停只会终止渲染阶段，没有恢复路径；需要重新选择曲目才能继续播放。
    pub async fn pause_toggle(&mut self) -> PauseOutcome {
        let session_id = match self.current.as_ref() {
            Some(handle) if handle.is_active() && handle.phase() == SessionPhase::Streaming => {
                handle.session_id()
            }
            _ => return PauseOutcome::Inactive,
        };

        warn!(
            target: "playback_controller",
            session_id,
            "pause terminates the render stage; resume is not supported"
        );
        self.emit(
            session_id,
            UpdatePayload::Notice(SessionNotice {
                level: NoticeLevel::Warn,
                message: "Playback halted; resume is not supported, select the track again"
                    .to_string(),
            }),
        );
        self.stop().await;
        PauseOutcome::Halted
    }

    pub async fn shutdown(&mut self) {
        self.stop().await;
        info!(target: "playback_controller", "playback controller shut down");
    }

    pub fn phase(&self) -> SessionPhase {
        self.current
            .as_ref()
            .map(PlaybackSessionHandle::phase)
            .unwrap_or(self.last_phase)
    }

    pub fn elapsed(&self) -> Duration {
        self.current
            .as_ref()
            .map(PlaybackSessionHandle::elapsed)
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.current
            .as_ref()
            .map(PlaybackSessionHandle::is_active)
            .unwrap_or(false)
    }

    pub fn current_session_id(&self) -> Option<u64> {
        self.current.as_ref().map(PlaybackSessionHandle::session_id)
    }

    pub fn current_request(&self) -> Option<&PlaybackRequest> {
        self.current.as_ref().map(PlaybackSessionHandle::request)
    }

    #[cfg(test)]
    pub(crate) fn current_handle(&self) -> Option<&PlaybackSessionHandle> {
        self.current.as_ref()
    }

    fn emit(&self, session_id: u64, payload: UpdatePayload) {
        if self
            .updates_tx
            .send(PlaybackUpdate::new(session_id, payload))
            .is_err()
        {
            warn!(
                target: "playback_controller",
                session_id,
                "playback update receiver dropped"
            );
        }
    }
}
