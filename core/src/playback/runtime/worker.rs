use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, ChildStderr};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, trace, warn};

use crate::playback::constants::{FETCH_ERROR_PREFIX, STAGE_REAP_TIMEOUT};
use crate::playback::error::{PlaybackError, Stage};
use crate::playback::lifecycle::SessionPhase;
use crate::playback::progress::parse_elapsed;
use crate::playback::types::{
    NoticeLevel, PlaybackRequest, PlaybackUpdate, ProgressPayload, UpdatePayload,
};
use crate::telemetry::events::record_session_summary;

use super::lines::DiagnosticLines;
use super::state::SessionState;

enum LoopExit {
    Stopped,
    Finished(ExitStatus),
    Errored(PlaybackError),
}

/// 读取渲染阶段的诊断流，转发进度，并在会话结束时回收两个阶段。
pub(crate) struct ProgressWorker {
    session_id: u64,
    request: PlaybackRequest,
    fetch: Child,
    render: Child,
    diagnostics: DiagnosticLines<ChildStderr>,
    fetch_drain: JoinHandle<()>,
    state: Arc<SessionState>,
    stop: Arc<Notify>,
    updates_tx: mpsc::UnboundedSender<PlaybackUpdate>,
    poll_interval: Duration,
}

impl ProgressWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session_id: u64,
        request: PlaybackRequest,
        fetch: Child,
        render: Child,
        diagnostics: DiagnosticLines<ChildStderr>,
        fetch_drain: JoinHandle<()>,
        state: Arc<SessionState>,
        stop: Arc<Notify>,
        updates_tx: mpsc::UnboundedSender<PlaybackUpdate>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            session_id,
            request,
            fetch,
            render,
            diagnostics,
            fetch_drain,
            state,
            stop,
            updates_tx,
            poll_interval,
        }
    }

    pub(crate) fn spawn(self) -> JoinHandle<SessionPhase> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(mut self) -> SessionPhase {
        let mut diagnostics_open = true;

        let exit = loop {
            if !self.state.is_running() {
                break LoopExit::Stopped;
            }

            if diagnostics_open {
                tokio::select! {
                    biased;

                    _ = self.stop.notified() => continue,

                    read = timeout(self.poll_interval, self.diagnostics.next_line()) => {
                        match read {
                            Err(_) => {}
                            Ok(Ok(Some(line))) => self.handle_line(&line),
                            Ok(Ok(None)) => {
                                debug!(
                                    target: "playback_worker",
                                    session_id = self.session_id,
                                    "render diagnostics closed"
                                );
                                diagnostics_open = false;
                            }
                            Ok(Err(err)) => break LoopExit::Errored(PlaybackError::Diagnostics(err)),
                        }
                    }
                }
            } else {
                tokio::select! {
                    biased;

                    _ = self.stop.notified() => continue,
                    _ = sleep(self.poll_interval) => {}
                }
            }

            match self.render.try_wait() {
                Ok(Some(status)) => {
                    if diagnostics_open {
                        self.drain_diagnostics().await;
                    }
                    break LoopExit::Finished(status);
                }
                Ok(None) => {}
                Err(source) => {
                    break LoopExit::Errored(PlaybackError::Supervise {
                        stage: Stage::Render,
                        source,
                    })
                }
            }
        };

        self.conclude(exit).await
    }

    /// 渲染阶段已退出，读完它退出前写下的诊断行。
    async fn drain_diagnostics(&mut self) {
        let deadline = Instant::now() + STAGE_REAP_TIMEOUT;
        while Instant::now() < deadline {
            match timeout(self.poll_interval, self.diagnostics.next_line()).await {
                Ok(Ok(Some(line))) => self.handle_line(&line),
                _ => break,
            }
        }
    }

    fn handle_line(&self, line: &str) {
        match parse_elapsed(line) {
            Ok(elapsed) => {
                if !self.state.is_running() {
                    return;
                }
                self.state.record_elapsed(elapsed);
                let payload = ProgressPayload::new(elapsed, self.request.expected_duration);
                self.emit(UpdatePayload::Progress(payload));
            }
            Err(warning) => {
                trace!(
                    target: "playback_worker",
                    session_id = self.session_id,
                    %warning,
                    line,
                    "ignoring diagnostic line"
                );
            }
        }
    }

    async fn conclude(mut self, exit: LoopExit) -> SessionPhase {
        self.state.request_stop();

        let phase = match exit {
            LoopExit::Stopped => {
                self.terminate_stages().await;
                self.state.transition(SessionPhase::Stopped);
                self.emit(UpdatePayload::Phase(SessionPhase::Stopped));
                SessionPhase::Stopped
            }
            LoopExit::Finished(status) => {
                info!(
                    target: "playback_worker",
                    session_id = self.session_id,
                    %status,
                    "render stage exited"
                );
                self.terminate_stages().await;
                self.state.transition(SessionPhase::Finished);
                self.emit(UpdatePayload::Finished(ProgressPayload::completed(
                    self.state.elapsed(),
                )));
                SessionPhase::Finished
            }
            LoopExit::Errored(err) => {
                warn!(
                    target: "playback_worker",
                    session_id = self.session_id,
                    %err,
                    "playback session failed"
                );
                self.terminate_stages().await;
                self.state.transition(SessionPhase::Errored);
                self.emit(UpdatePayload::Errored(err.to_string()));
                SessionPhase::Errored
            }
        };

        record_session_summary(
            self.session_id,
            &self.request.title,
            phase,
            self.state.elapsed(),
        );
        phase
    }

    /// 先终止渲染阶段，再终止拉流阶段，最后等待拉流诊断读完，保证之后不再有事件。
    async fn terminate_stages(&mut self) {
        terminate_stage(self.session_id, Stage::Render, &mut self.render).await;
        terminate_stage(self.session_id, Stage::Fetch, &mut self.fetch).await;

        if timeout(STAGE_REAP_TIMEOUT, &mut self.fetch_drain)
            .await
            .is_err()
        {
            warn!(
                target: "playback_worker",
                session_id = self.session_id,
                "fetch diagnostics still open after stage exit"
            );
            self.fetch_drain.abort();
        }
    }

    fn emit(&self, payload: UpdatePayload) {
        if let Err(err) = self
            .updates_tx
            .send(PlaybackUpdate::new(self.session_id, payload))
        {
            debug!(
                target: "playback_worker",
                session_id = self.session_id,
                %err,
                "update receiver dropped"
            );
        }
    }
}

/// 通过 `start_kill` 强制终止（Unix 上为 SIGKILL），随后在超时内回收。
async fn terminate_stage(session_id: u64, stage: Stage, child: &mut Child) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(target: "playback_worker", session_id, %stage, %status, "stage already exited");
            return;
        }
        Ok(None) => {}
        Err(err) => {
            warn!(target: "playback_worker", session_id, %stage, %err, "failed to poll stage");
        }
    }

    if let Err(err) = child.start_kill() {
        warn!(target: "playback_worker", session_id, %stage, %err, "failed to signal stage");
    }

    match timeout(STAGE_REAP_TIMEOUT, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(target: "playback_worker", session_id, %stage, %status, "stage terminated");
        }
        Ok(Err(err)) => {
            warn!(target: "playback_worker", session_id, %stage, %err, "failed to reap stage");
        }
        Err(_) => {
            warn!(target: "playback_worker", session_id, %stage, "stage did not exit in time");
        }
    }
}

/// 拉流阶段的标准错误只写日志；以 `ERROR` 开头的行转成错误提示。
pub(crate) async fn drain_fetch_diagnostics(
    session_id: u64,
    mut lines: DiagnosticLines<ChildStderr>,
    updates_tx: mpsc::UnboundedSender<PlaybackUpdate>,
) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.starts_with(FETCH_ERROR_PREFIX) {
                    warn!(target: "playback_worker", session_id, line = %line, "fetch stage reported an error");
                    let _ = updates_tx.send(PlaybackUpdate::notice(
                        session_id,
                        NoticeLevel::Error,
                        line,
                    ));
                } else {
                    debug!(target: "playback_worker", session_id, line = %line, "fetch stage diagnostics");
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(target: "playback_worker", session_id, %err, "failed to read fetch diagnostics");
                break;
            }
        }
    }
}
