use std::time::Duration;

use tubeplay_core::playback::{NoticeLevel, PlaybackUpdate, ProgressPayload, SessionPhase};
use tubeplay_core::search::LookupError;

use super::*;

fn result(title: &str) -> SearchResult {
    SearchResult {
        title: title.into(),
        source_reference: format!("https://example.test/{title}"),
        channel: None,
        duration: None,
    }
}

fn progress(session_id: u64, secs: u64, expected: Option<u64>) -> PlaybackUpdate {
    PlaybackUpdate::new(
        session_id,
        UpdatePayload::Progress(ProgressPayload::new(
            Duration::from_secs(secs),
            expected.map(Duration::from_secs),
        )),
    )
}

fn streaming_view(session_id: u64, title: &str) -> PlayerView {
    let mut view = PlayerView::new();
    view.play_started(session_id, title);
    view.apply_update(&PlaybackUpdate::phase(session_id, SessionPhase::Starting));
    view.apply_update(&PlaybackUpdate::phase(session_id, SessionPhase::Streaming));
    view
}

#[test]
fn starts_idle() {
    let view = PlayerView::new();
    assert_eq!(view.title_label(), IDLE_LABEL);
    assert_eq!(view.progress(), 0);
    assert!(!view.pause_enabled());
    assert!(view.alert().is_none());
    assert!(view.result(1).is_none());
}

#[test]
fn search_results_are_numbered_from_one() {
    let mut view = PlayerView::new();
    view.search_dispatched(1, "waves");

    let output = view.apply_search(SearchEvent::Completed {
        request_id: 1,
        query: "waves".into(),
        results: vec![result("a"), result("b")],
    });

    assert_eq!(
        output,
        vec![
            Output::Line(" 1. a | https://example.test/a".into()),
            Output::Line(" 2. b | https://example.test/b".into()),
        ]
    );
    assert_eq!(view.result(2).map(|r| r.title.as_str()), Some("b"));
    assert!(view.result(0).is_none());
    assert!(view.result(3).is_none());
}

#[test]
fn failed_lookup_keeps_previous_results() {
    let mut view = PlayerView::new();
    view.search_dispatched(1, "first");
    view.apply_search(SearchEvent::Completed {
        request_id: 1,
        query: "first".into(),
        results: vec![result("kept")],
    });

    view.search_dispatched(2, "second");
    let output = view.apply_search(SearchEvent::Failed {
        request_id: 2,
        query: "second".into(),
        error: LookupError::Status { status: 503 },
    });

    assert_eq!(output.len(), 1);
    assert!(matches!(&output[0], Output::Line(line) if line.starts_with("search failed")));
    assert_eq!(view.results().len(), 1);
    assert_eq!(view.results()[0].title, "kept");
}

#[test]
fn superseded_search_results_are_ignored() {
    let mut view = PlayerView::new();
    view.search_dispatched(1, "old");
    view.search_dispatched(2, "new");

    let output = view.apply_search(SearchEvent::Completed {
        request_id: 1,
        query: "old".into(),
        results: vec![result("stale")],
    });
    assert!(output.is_empty());
    assert!(view.results().is_empty());
}

#[test]
fn streaming_enables_pause_and_tracks_progress() {
    let mut view = streaming_view(3, "Song");
    assert!(view.pause_enabled());
    assert_eq!(view.title_label(), "Song - 00:00 / Streaming");

    let output = view.apply_update(&progress(3, 65, Some(130)));
    assert_eq!(view.title_label(), "Song - 01:05 / Streaming");
    assert_eq!(view.progress(), 50);
    assert_eq!(
        output,
        Some(Output::Status(
            "[##########----------]  50% Song - 01:05 / Streaming".into()
        ))
    );

    assert_eq!(view.apply_update(&progress(3, 65, Some(130))), None);
}

#[test]
fn unknown_duration_leaves_bar_unchanged() {
    let mut view = streaming_view(1, "Live set");
    view.apply_update(&progress(1, 3723, None));
    assert_eq!(view.title_label(), "Live set - 62:03 / Streaming");
    assert_eq!(view.progress(), 0);
}

#[test]
fn finish_fills_the_bar_and_disables_pause() {
    let mut view = streaming_view(2, "Song");
    view.apply_update(&progress(2, 10, None));

    let output = view.apply_update(&PlaybackUpdate::new(
        2,
        UpdatePayload::Finished(ProgressPayload::completed(Duration::from_secs(10))),
    ));

    assert_eq!(view.title_label(), FINISHED_LABEL);
    assert_eq!(view.progress(), 100);
    assert!(!view.pause_enabled());
    assert_eq!(
        output,
        Some(Output::Line(
            "[####################] 100% Playback Finished".into()
        ))
    );
}

#[test]
fn errors_raise_an_alert() {
    let mut view = streaming_view(4, "Song");
    let output = view.apply_update(&PlaybackUpdate::new(
        4,
        UpdatePayload::Errored("render stage crashed".into()),
    ));

    assert_eq!(output, Some(Output::Alert("render stage crashed".into())));
    assert_eq!(view.alert(), Some("render stage crashed"));
    assert!(!view.pause_enabled());
    assert_eq!(view.title_label(), IDLE_LABEL);
}

#[test]
fn failed_start_raises_an_alert_and_resets() {
    let mut view = streaming_view(1, "Song");
    let output = view.play_failed("failed to launch fetch stage `yt-dlp`");

    assert!(matches!(output, Output::Alert(_)));
    assert!(!view.pause_enabled());
    assert_eq!(view.title_label(), IDLE_LABEL);
    assert!(view
        .apply_update(&PlaybackUpdate::new(2, UpdatePayload::Errored("x".into())))
        .is_none());
}

#[test]
fn updates_from_replaced_sessions_are_dropped() {
    let mut view = streaming_view(1, "First");
    view.play_started(2, "Second");

    assert_eq!(
        view.apply_update(&PlaybackUpdate::phase(1, SessionPhase::Stopped)),
        None
    );
    view.apply_update(&PlaybackUpdate::phase(2, SessionPhase::Starting));
    assert_eq!(view.title_label(), "Second - Starting");
}

#[test]
fn stop_returns_to_idle_and_notices_are_forwarded() {
    let mut view = streaming_view(5, "Song");

    let notice = view.apply_update(&PlaybackUpdate::notice(
        5,
        NoticeLevel::Warn,
        "resume is not supported",
    ));
    assert_eq!(
        notice,
        Some(Output::Line("warning: resume is not supported".into()))
    );

    let error = view.apply_update(&PlaybackUpdate::notice(
        5,
        NoticeLevel::Error,
        "ERROR: Video unavailable",
    ));
    assert_eq!(error, Some(Output::Alert("ERROR: Video unavailable".into())));

    view.apply_update(&PlaybackUpdate::phase(5, SessionPhase::Stopped));
    assert_eq!(view.title_label(), IDLE_LABEL);
    assert!(!view.pause_enabled());
}
