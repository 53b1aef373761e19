//! 播放会话控制：拉流进程经管道接入渲染进程，并从渲染进程的诊断流中解析进度。

mod constants;
mod controller;
mod runtime;

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod progress;
pub mod types;

pub use config::{PlaybackConfig, StageCommand};
pub use controller::PlaybackController;
pub use error::{PlaybackError, Stage};
pub use lifecycle::SessionPhase;
pub use progress::{format_elapsed, parse_elapsed, ProgressParseWarning};
pub use runtime::PlaybackSessionHandle;
pub use types::{
    NoticeLevel, PauseOutcome, PlaybackRequest, PlaybackUpdate, ProgressPayload, SessionNotice,
    UpdatePayload,
};
