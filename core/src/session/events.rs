use tokio::sync::mpsc;

use crate::playback::PlaybackUpdate;
use crate::search::{LookupError, SearchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Completed {
        request_id: u64,
        query: String,
        results: Vec<SearchResult>,
    },
    Failed {
        request_id: u64,
        query: String,
        error: LookupError,
    },
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Search(SearchEvent),
    Playback(PlaybackUpdate),
}

/// UI 线程独占的事件出口；同一来源的事件按发出顺序到达。
pub struct PlayerEvents {
    search_rx: mpsc::UnboundedReceiver<SearchEvent>,
    playback_rx: mpsc::UnboundedReceiver<PlaybackUpdate>,
}

impl PlayerEvents {
    pub(crate) fn new(
        search_rx: mpsc::UnboundedReceiver<SearchEvent>,
        playback_rx: mpsc::UnboundedReceiver<PlaybackUpdate>,
    ) -> Self {
        Self {
            search_rx,
            playback_rx,
        }
    }

    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        tokio::select! {
            Some(update) = self.playback_rx.recv() => Some(PlayerEvent::Playback(update)),
            Some(event) = self.search_rx.recv() => Some(PlayerEvent::Search(event)),
            else => None,
        }
    }

    /// 非阻塞地取出一条已就绪的事件。
    pub fn try_recv(&mut self) -> Option<PlayerEvent> {
        if let Ok(update) = self.playback_rx.try_recv() {
            return Some(PlayerEvent::Playback(update));
        }
        self.search_rx.try_recv().ok().map(PlayerEvent::Search)
    }
}
