use std::time::Duration;

pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub(crate) const STDERR_CHUNK_BYTES: usize = 4096;
pub(crate) const MAX_DIAGNOSTIC_LINE_BYTES: usize = 64 * 1024;
pub(crate) const STAGE_REAP_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const FETCH_ERROR_PREFIX: &str = "ERROR";
