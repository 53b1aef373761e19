//! 应用配置：默认值 -> 可选的 JSON 配置文件 -> 环境变量覆盖。

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::playback::PlaybackConfig;
use crate::search::SearchConfig;
use crate::telemetry::TelemetryConfig;

pub const ENV_CONFIG_PATH: &str = "TUBEPLAY_CONFIG";
pub const ENV_SEARCH_LIMIT: &str = "TUBEPLAY_SEARCH_LIMIT";
pub const ENV_SEARCH_ENDPOINT: &str = "TUBEPLAY_SEARCH_ENDPOINT";
pub const ENV_SEARCH_TIMEOUT_MS: &str = "TUBEPLAY_SEARCH_TIMEOUT_MS";
pub const ENV_FETCH_BIN: &str = "TUBEPLAY_FETCH_BIN";
pub const ENV_RENDER_BIN: &str = "TUBEPLAY_RENDER_BIN";
pub const ENV_POLL_INTERVAL_MS: &str = "TUBEPLAY_POLL_INTERVAL_MS";
pub const ENV_LOG_DIR: &str = "TUBEPLAY_LOG_DIR";
pub const ENV_LOG_JSON: &str = "TUBEPLAY_LOG_JSON";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub playback: PlaybackConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// `lookup` 按变量名取值，便于在测试中替换进程环境。
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_empty(&lookup, ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(limit) = parse_var::<usize, _>(lookup, ENV_SEARCH_LIMIT)? {
            if limit == 0 {
                return Err(ConfigError::InvalidValue {
                    var: ENV_SEARCH_LIMIT,
                    value: "0".to_string(),
                });
            }
            self.search.default_limit = limit;
        }
        if let Some(endpoint) = non_empty(lookup, ENV_SEARCH_ENDPOINT) {
            self.search.endpoint = endpoint;
        }
        if let Some(timeout_ms) = parse_var::<u64, _>(lookup, ENV_SEARCH_TIMEOUT_MS)? {
            self.search.timeout_ms = timeout_ms;
        }
        if let Some(program) = non_empty(lookup, ENV_FETCH_BIN) {
            self.playback.fetch.program = program;
        }
        if let Some(program) = non_empty(lookup, ENV_RENDER_BIN) {
            self.playback.render.program = program;
        }
        if let Some(interval) = parse_var::<u64, _>(lookup, ENV_POLL_INTERVAL_MS)? {
            self.playback.poll_interval_ms = interval;
        }
        if let Some(dir) = non_empty(lookup, ENV_LOG_DIR) {
            self.telemetry.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = non_empty(lookup, ENV_LOG_JSON) {
            self.telemetry.json = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                var: ENV_LOG_JSON,
                value: raw,
            })?;
        }
        Ok(())
    }
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, var) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        None => Ok(None),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::load_with(env(&[])).unwrap();
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.playback.fetch.program, "yt-dlp");
        assert_eq!(config.playback.render.program, "ffplay");
        assert!(!config.telemetry.json);
    }

    #[test]
    fn environment_overrides_apply() {
        let config = AppConfig::load_with(env(&[
            (ENV_SEARCH_LIMIT, "5"),
            (ENV_FETCH_BIN, "/opt/bin/yt-dlp"),
            (ENV_RENDER_BIN, "  "),
            (ENV_POLL_INTERVAL_MS, "250"),
            (ENV_LOG_DIR, "/var/log/tubeplay"),
            (ENV_LOG_JSON, "yes"),
        ]))
        .unwrap();

        assert_eq!(config.search.default_limit, 5);
        assert_eq!(config.playback.fetch.program, "/opt/bin/yt-dlp");
        assert_eq!(config.playback.render.program, "ffplay");
        assert_eq!(config.playback.poll_interval_ms, 250);
        assert_eq!(
            config.telemetry.log_dir,
            Some(PathBuf::from("/var/log/tubeplay"))
        );
        assert!(config.telemetry.json);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = AppConfig::load_with(env(&[(ENV_SEARCH_LIMIT, "ten")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for TUBEPLAY_SEARCH_LIMIT: \"ten\"");

        let err = AppConfig::load_with(env(&[(ENV_SEARCH_LIMIT, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_SEARCH_LIMIT, .. }));

        let err = AppConfig::load_with(env(&[(ENV_LOG_JSON, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_LOG_JSON, .. }));
    }

    #[test]
    fn config_file_is_merged_with_defaults_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "playback": {{ "render": {{ "program": "mpv", "args": ["--no-video", "-"] }} }},
                 "search": {{ "default_limit": 3 }} }}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = AppConfig::load_with(env(&[
            (ENV_CONFIG_PATH, path.as_str()),
            (ENV_SEARCH_LIMIT, "4"),
        ]))
        .unwrap();

        assert_eq!(config.playback.render.program, "mpv");
        assert_eq!(config.playback.render.args, vec!["--no-video", "-"]);
        assert_eq!(config.playback.fetch.program, "yt-dlp");
        assert_eq!(config.search.default_limit, 4);
        assert_eq!(config.search.timeout_ms, 10_000);
    }

    #[test]
    fn unreadable_config_file_is_reported() {
        let err = AppConfig::load_with(env(&[(ENV_CONFIG_PATH, "/nonexistent/tubeplay.json")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
