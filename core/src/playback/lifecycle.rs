//! 播放会话状态机的阶段划分。

use serde::Serialize;

/// 单个播放会话所处的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Starting,
    Streaming,
    Stopped,
    Finished,
    Errored,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Starting => "starting",
            SessionPhase::Streaming => "streaming",
            SessionPhase::Stopped => "stopped",
            SessionPhase::Finished => "finished",
            SessionPhase::Errored => "errored",
        }
    }

    /// 会话已结束，进程句柄均已释放。
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionPhase::Stopped | SessionPhase::Finished | SessionPhase::Errored
        )
    }

    /// 判断状态机是否允许从当前阶段迁移到 `next`。
    ///
    /// 终止阶段只能由新会话的 `Starting` 接续；`stop()` 在任何阶段都可调用，
    /// 因此 `Idle -> Stopped` 也是合法迁移。
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;

        match (self, next) {
            (Idle, Starting) | (Idle, Stopped) => true,
            (Starting, Streaming) | (Starting, Errored) | (Starting, Stopped) => true,
            (Streaming, Stopped) | (Streaming, Finished) | (Streaming, Errored) => true,
            (Stopped, Starting) | (Finished, Starting) | (Errored, Starting) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
