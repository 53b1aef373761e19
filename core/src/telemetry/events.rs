use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::playback::lifecycle::SessionPhase;
use crate::search::LookupError;

pub(crate) const TARGET: &str = "telemetry::player";
pub(crate) const EVENT_SEARCH: &str = "search_completed";
pub(crate) const EVENT_SEARCH_FAILED: &str = "search_failed";
pub(crate) const EVENT_TRANSITION: &str = "session_transition";
pub(crate) const EVENT_SUMMARY: &str = "session_summary";

#[derive(Debug, Serialize)]
pub struct SearchCompletedEvent {
    pub query_chars: usize,
    pub limit: usize,
    pub results: usize,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchFailedEvent {
    pub query_chars: usize,
    pub error: String,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SessionTransitionEvent {
    pub session_id: u64,
    pub from: SessionPhase,
    pub to: SessionPhase,
}

#[derive(Debug, Serialize)]
pub struct SessionSummaryEvent<'a> {
    pub session_id: u64,
    pub title: &'a str,
    pub phase: SessionPhase,
    pub elapsed_ms: u64,
}

pub fn record_search_completed(query: &str, limit: usize, results: usize, latency: Duration) {
    let event = SearchCompletedEvent {
        query_chars: query.chars().count(),
        limit,
        results,
        latency_ms: duration_to_ms(latency),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_SEARCH,
            results = event.results,
            latency_ms = event.latency_ms,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_SEARCH,
            %err,
            "failed to encode search event"
        ),
    }
}

pub fn record_search_failed(query: &str, error: &LookupError, latency: Duration) {
    let event = SearchFailedEvent {
        query_chars: query.chars().count(),
        error: error.to_string(),
        latency_ms: duration_to_ms(latency),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => warn!(
            target: TARGET,
            event = EVENT_SEARCH_FAILED,
            latency_ms = event.latency_ms,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_SEARCH_FAILED,
            %err,
            "failed to encode search failure event"
        ),
    }
}

pub fn record_session_transition(session_id: u64, from: SessionPhase, to: SessionPhase) {
    let event = SessionTransitionEvent {
        session_id,
        from,
        to,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_TRANSITION,
            session_id,
            from = %from,
            to = %to,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_TRANSITION,
            %err,
            "failed to encode session transition event"
        ),
    }
}

pub fn record_session_summary(session_id: u64, title: &str, phase: SessionPhase, elapsed: Duration) {
    let event = SessionSummaryEvent {
        session_id,
        title,
        phase,
        elapsed_ms: duration_to_ms(elapsed),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_SUMMARY,
            session_id,
            phase = %phase,
            elapsed_ms = event.elapsed_ms,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_SUMMARY,
            %err,
            "failed to encode session summary event"
        ),
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}
