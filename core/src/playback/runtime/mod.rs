mod handle;
mod lines;
mod state;
mod worker;

pub use handle::PlaybackSessionHandle;

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::{mpsc, Notify};
use tracing::info;

use crate::playback::config::PlaybackConfig;
use crate::playback::error::{PlaybackError, Stage};
use crate::playback::lifecycle::SessionPhase;
use crate::playback::types::{PlaybackRequest, PlaybackUpdate};

use self::lines::DiagnosticLines;
use self::state::SessionState;
use self::worker::{drain_fetch_diagnostics, ProgressWorker};

/// 建立 拉流 -> 渲染 两段管线并启动进度 worker。
///
/// 任一阶段启动失败时返回错误；已经启动的子进程随 `kill_on_drop` 一起被终止。
pub(crate) fn spawn_session(
    session_id: u64,
    config: &PlaybackConfig,
    request: PlaybackRequest,
    updates_tx: mpsc::UnboundedSender<PlaybackUpdate>,
) -> Result<PlaybackSessionHandle, PlaybackError> {
    let state = Arc::new(SessionState::new(session_id));
    state.transition(SessionPhase::Starting);
    let _ = updates_tx.send(PlaybackUpdate::phase(session_id, SessionPhase::Starting));

    let mut fetch = Command::new(&config.fetch.program)
        .args(&config.fetch.args)
        .arg(&request.source_reference)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| PlaybackError::Spawn {
            stage: Stage::Fetch,
            program: config.fetch.program.clone(),
            source,
        })?;

    let fetch_stdout = fetch.stdout.take().ok_or(PlaybackError::MissingPipe {
        stage: Stage::Fetch,
        stream: "stdout",
    })?;
    let fetch_stderr = fetch.stderr.take().ok_or(PlaybackError::MissingPipe {
        stage: Stage::Fetch,
        stream: "stderr",
    })?;
    let render_stdin =
        TryInto::<Stdio>::try_into(fetch_stdout).map_err(PlaybackError::Pipe)?;

    let mut render = Command::new(&config.render.program)
        .args(&config.render.args)
        .stdin(render_stdin)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| PlaybackError::Spawn {
            stage: Stage::Render,
            program: config.render.program.clone(),
            source,
        })?;

    let render_stderr = render.stderr.take().ok_or(PlaybackError::MissingPipe {
        stage: Stage::Render,
        stream: "stderr",
    })?;

    info!(
        target: "playback_controller",
        session_id,
        fetch = %config.fetch.display(),
        render = %config.render.display(),
        reference = %request.source_reference,
        "playback pipeline spawned"
    );

    state.mark_running();
    state.transition(SessionPhase::Streaming);
    let _ = updates_tx.send(PlaybackUpdate::phase(session_id, SessionPhase::Streaming));

    let fetch_drain = tokio::spawn(drain_fetch_diagnostics(
        session_id,
        DiagnosticLines::new(fetch_stderr, config.stderr_chunk_bytes),
        updates_tx.clone(),
    ));

    let stop = Arc::new(Notify::new());
    let worker = ProgressWorker::new(
        session_id,
        request.clone(),
        fetch,
        render,
        DiagnosticLines::new(render_stderr, config.stderr_chunk_bytes),
        fetch_drain,
        Arc::clone(&state),
        Arc::clone(&stop),
        updates_tx,
        config.poll_interval(),
    );

    Ok(PlaybackSessionHandle::new(
        session_id,
        request,
        state,
        stop,
        worker.spawn(),
    ))
}
