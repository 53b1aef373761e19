use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::constants::{DEFAULT_POLL_INTERVAL_MS, STDERR_CHUNK_BYTES};

/// 一个外部阶段的命令行：程序名加固定参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl StageCommand {
    pub fn new<S: Into<String>>(program: S, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// 命令行的可读形式，仅用于日志。
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// 拉流阶段，来源引用会被追加为最后一个参数。
    pub fetch: StageCommand,
    /// 渲染阶段，从标准输入读取音频并在标准错误输出进度。
    pub render: StageCommand,
    pub poll_interval_ms: u64,
    pub stderr_chunk_bytes: usize,
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fetch: StageCommand::new(
                "yt-dlp",
                &[
                    "--quiet",
                    "--no-warnings",
                    "--default-search=ytsearch",
                    "-f",
                    "bestaudio",
                    "-o",
                    "-",
                ],
            ),
            render: StageCommand::new("ffplay", &["-autoexit", "-nodisp", "-i", "pipe:0"]),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            stderr_chunk_bytes: STDERR_CHUNK_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_stream_best_audio_into_headless_player() {
        let config = PlaybackConfig::default();
        assert_eq!(
            config.fetch.display(),
            "yt-dlp --quiet --no-warnings --default-search=ytsearch -f bestaudio -o -"
        );
        assert_eq!(config.render.display(), "ffplay -autoexit -nodisp -i pipe:0");
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let config = PlaybackConfig {
            poll_interval_ms: 0,
            ..PlaybackConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
