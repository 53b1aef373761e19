use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::warn;

use crate::playback::lifecycle::SessionPhase;
use crate::telemetry::events::record_session_transition;

/// 会话在控制器与进度 worker 之间共享的状态。
pub(crate) struct SessionState {
    session_id: u64,
    running: AtomicBool,
    elapsed_ms: AtomicU64,
    phase: Mutex<SessionPhase>,
}

impl SessionState {
    pub(crate) fn new(session_id: u64) -> Self {
        Self {
            session_id,
            running: AtomicBool::new(false),
            elapsed_ms: AtomicU64::new(0),
            phase: Mutex::new(SessionPhase::Idle),
        }
    }

    pub(crate) fn mark_running(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// 清除运行标记，只有第一次调用返回 `true`。
    pub(crate) fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn record_elapsed(&self, elapsed: Duration) {
        let millis = elapsed.as_millis().min(u64::MAX as u128) as u64;
        self.elapsed_ms.store(millis, Ordering::SeqCst);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        *self
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn transition(&self, next: SessionPhase) -> bool {
        let mut guard = self
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = *guard;

        if !current.can_transition_to(next) {
            warn!(
                target: "playback_controller",
                session_id = self.session_id,
                from = %current,
                to = %next,
                "rejected session phase transition"
            );
            return false;
        }

        *guard = next;
        drop(guard);
        record_session_transition(self.session_id, current, next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_request_is_reported_once() {
        let state = SessionState::new(1);
        state.mark_running();
        assert!(state.request_stop());
        assert!(!state.request_stop());
        assert!(!state.is_running());
    }

    #[test]
    fn invalid_transition_keeps_phase() {
        let state = SessionState::new(7);
        assert!(!state.transition(SessionPhase::Finished));
        assert_eq!(state.phase(), SessionPhase::Idle);

        assert!(state.transition(SessionPhase::Starting));
        assert!(state.transition(SessionPhase::Streaming));
        assert!(state.transition(SessionPhase::Finished));
        assert!(!state.transition(SessionPhase::Stopped));
        assert_eq!(state.phase(), SessionPhase::Finished);
    }

    #[test]
    fn elapsed_is_stored_in_millis() {
        let state = SessionState::new(3);
        state.record_elapsed(Duration::from_secs_f64(65.2));
        assert_eq!(state.elapsed(), Duration::from_millis(65_200));
    }
}
