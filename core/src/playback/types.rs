use std::time::{Duration, SystemTime};

use super::lifecycle::SessionPhase;
use super::progress::{format_elapsed, parse_clock_duration, progress_percent};
use crate::search::SearchResult;

/// 启动一次播放所需的全部信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub source_reference: String,
    pub title: String,
    pub expected_duration: Option<Duration>,
}

impl PlaybackRequest {
    pub fn new<S: Into<String>>(source_reference: S) -> Self {
        let source_reference = source_reference.into();
        Self {
            title: source_reference.clone(),
            source_reference,
            expected_duration: None,
        }
    }
}

impl From<&SearchResult> for PlaybackRequest {
    fn from(result: &SearchResult) -> Self {
        Self {
            source_reference: result.source_reference.clone(),
            title: result.title.clone(),
            expected_duration: result.duration.as_deref().and_then(parse_clock_duration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPayload {
    pub elapsed: Duration,
    pub elapsed_label: String,
    pub percent: Option<u8>,
}

impl ProgressPayload {
    pub fn new(elapsed: Duration, expected: Option<Duration>) -> Self {
        Self {
            elapsed,
            elapsed_label: format_elapsed(elapsed),
            percent: progress_percent(elapsed, expected),
        }
    }

    /// 渲染阶段自然退出时的最终进度，进度条视为已满。
    pub fn completed(elapsed: Duration) -> Self {
        Self {
            elapsed,
            elapsed_label: format_elapsed(elapsed),
            percent: Some(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNotice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePayload {
    Phase(SessionPhase),
    Progress(ProgressPayload),
    Notice(SessionNotice),
    Finished(ProgressPayload),
    Errored(String),
}

/// 控制器按发出顺序投递给 UI 的事件。
#[derive(Debug, Clone)]
pub struct PlaybackUpdate {
    pub session_id: u64,
    pub issued_at: SystemTime,
    pub payload: UpdatePayload,
}

impl PlaybackUpdate {
    pub fn new(session_id: u64, payload: UpdatePayload) -> Self {
        Self {
            session_id,
            issued_at: SystemTime::now(),
            payload,
        }
    }

    pub fn phase(session_id: u64, phase: SessionPhase) -> Self {
        Self::new(session_id, UpdatePayload::Phase(phase))
    }

    pub fn notice(session_id: u64, level: NoticeLevel, message: impl Into<String>) -> Self {
        Self::new(
            session_id,
            UpdatePayload::Notice(SessionNotice {
                level,
                message: message.into(),
            }),
        )
    }
}

/// `pause_toggle` 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    /// 渲染阶段已被终止，没有恢复路径。
    Halted,
    /// 当前没有正在播放的会话。
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_from_search_result_carries_duration() {
        let result = SearchResult {
            title: "Song".into(),
            source_reference: "https://www.youtube.com/watch?v=abc".into(),
            channel: None,
            duration: Some("2:05".into()),
        };

        let request = PlaybackRequest::from(&result);
        assert_eq!(request.title, "Song");
        assert_eq!(request.source_reference, result.source_reference);
        assert_eq!(request.expected_duration, Some(Duration::from_secs(125)));
    }

    #[test]
    fn progress_payload_formats_label() {
        let payload = ProgressPayload::new(Duration::from_millis(65_200), None);
        assert_eq!(payload.elapsed_label, "01:05");
        assert_eq!(payload.percent, None);
        assert_eq!(ProgressPayload::completed(payload.elapsed).percent, Some(100));
    }
}
