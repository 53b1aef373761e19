//! 终端界面的视图模型：标题、进度、暂停按钮与告警，全部由事件驱动。

use tubeplay_core::playback::{
    NoticeLevel, PlaybackUpdate, ProgressPayload, SessionPhase, UpdatePayload,
};
use tubeplay_core::search::SearchResult;
use tubeplay_core::session::{PlaybackStatus, SearchEvent};

pub const IDLE_LABEL: &str = "No music playing";
pub const FINISHED_LABEL: &str = "Playback Finished";

const BAR_WIDTH: usize = 20;

/// 需要写到终端的内容。`Status` 覆盖当前状态行，其余各占一行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Line(String),
    Status(String),
    Alert(String),
}

#[derive(Debug)]
pub struct PlayerView {
    results: Vec<SearchResult>,
    latest_search: u64,
    session_id: Option<u64>,
    track_title: String,
    title_label: String,
    progress: u8,
    pause_enabled: bool,
    alert: Option<String>,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            latest_search: 0,
            session_id: None,
            track_title: String::new(),
            title_label: IDLE_LABEL.to_string(),
            progress: 0,
            pause_enabled: false,
            alert: None,
        }
    }
}

impl PlayerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_label(&self) -> &str {
        &self.title_label
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn pause_enabled(&self) -> bool {
        self.pause_enabled
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// `number` 从 1 开始。
    pub fn result(&self, number: usize) -> Option<&SearchResult> {
        number.checked_sub(1).and_then(|index| self.results.get(index))
    }

    pub fn search_dispatched(&mut self, request_id: u64, query: &str) -> Output {
        self.latest_search = request_id;
        Output::Line(format!("searching for \"{query}\"..."))
    }

    pub fn play_started(&mut self, session_id: u64, title: &str) {
        self.session_id = Some(session_id);
        self.track_title = title.to_string();
        self.alert = None;
    }

    /// 启动失败的 `Errored` 更新属于未登记的会话，会被 `apply_update` 忽略，告警在这里给出。
    pub fn play_failed(&mut self, message: &str) -> Output {
        self.reset_playback();
        self.alert = Some(message.to_string());
        Output::Alert(format!("could not start playback: {message}"))
    }

    pub fn apply_search(&mut self, event: SearchEvent) -> Vec<Output> {
        match event {
            SearchEvent::Completed {
                request_id,
                query,
                results,
            } => {
                if request_id != self.latest_search {
                    return Vec::new();
                }
                self.results = results;
                if self.results.is_empty() {
                    return vec![Output::Line(format!("no results for \"{query}\""))];
                }
                self.results
                    .iter()
                    .enumerate()
                    .map(|(index, result)| {
                        Output::Line(format!("{:>2}. {}", index + 1, result.display_line()))
                    })
                    .collect()
            }
            SearchEvent::Failed {
                request_id, error, ..
            } => {
                if request_id != self.latest_search {
                    return Vec::new();
                }
                vec![Output::Line(format!("search failed: {error}"))]
            }
        }
    }

    /// 只处理当前会话的更新；被替换掉的旧会话的尾部事件直接丢弃。
    pub fn apply_update(&mut self, update: &PlaybackUpdate) -> Option<Output> {
        if self.session_id != Some(update.session_id) {
            return None;
        }

        match &update.payload {
            UpdatePayload::Phase(SessionPhase::Starting) => {
                self.pause_enabled = false;
                self.progress = 0;
                self.title_label = format!("{} - Starting", self.track_title);
                Some(Output::Status(self.title_label.clone()))
            }
            UpdatePayload::Phase(SessionPhase::Streaming) => {
                self.pause_enabled = true;
                self.title_label = format!("{} - 00:00 / Streaming", self.track_title);
                Some(self.status_line())
            }
            UpdatePayload::Progress(progress) => self.apply_progress(progress),
            UpdatePayload::Phase(SessionPhase::Stopped) => {
                self.reset_playback();
                Some(Output::Line("playback stopped".to_string()))
            }
            UpdatePayload::Phase(_) => None,
            UpdatePayload::Notice(notice) => Some(match notice.level {
                NoticeLevel::Error => Output::Alert(notice.message.clone()),
                NoticeLevel::Warn => Output::Line(format!("warning: {}", notice.message)),
                NoticeLevel::Info => Output::Line(notice.message.clone()),
            }),
            UpdatePayload::Finished(_) => {
                self.pause_enabled = false;
                self.progress = 100;
                self.title_label = FINISHED_LABEL.to_string();
                self.session_id = None;
                Some(Output::Line(self.status_text()))
            }
            UpdatePayload::Errored(message) => {
                self.reset_playback();
                self.alert = Some(message.clone());
                Some(Output::Alert(message.clone()))
            }
        }
    }

    pub fn describe(&self, status: &PlaybackStatus) -> Vec<Output> {
        let mut lines = vec![Output::Line(self.status_text())];
        match (&status.title, status.session_id) {
            (Some(title), Some(id)) => lines.push(Output::Line(format!(
                "session {id}: {title} ({})",
                status.phase
            ))),
            _ => lines.push(Output::Line(format!("session: {}", status.phase))),
        }
        if let Some(alert) = self.alert() {
            lines.push(Output::Line(format!("last error: {alert}")));
        }
        lines
    }

    fn apply_progress(&mut self, progress: &ProgressPayload) -> Option<Output> {
        let label = format!("{} - {} / Streaming", self.track_title, progress.elapsed_label);
        let percent = progress.percent.unwrap_or(self.progress);
        if label == self.title_label && percent == self.progress {
            return None;
        }
        self.title_label = label;
        self.progress = percent;
        Some(self.status_line())
    }

    fn reset_playback(&mut self) {
        self.session_id = None;
        self.pause_enabled = false;
        self.progress = 0;
        self.title_label = IDLE_LABEL.to_string();
    }

    fn status_line(&self) -> Output {
        Output::Status(self.status_text())
    }

    fn status_text(&self) -> String {
        let filled = usize::from(self.progress()) * BAR_WIDTH / 100;
        format!(
            "[{}{}] {:>3}% {}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            self.progress(),
            self.title_label()
        )
    }
}

#[cfg(test)]
mod tests;
