use std::io;

use thiserror::Error;

/// 外部进程管线中的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Render => "render",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("source reference cannot be empty")]
    EmptyReference,
    #[error("failed to launch {stage} stage `{program}`: {source}")]
    Spawn {
        stage: Stage,
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{stage} stage did not expose its {stream} pipe")]
    MissingPipe { stage: Stage, stream: &'static str },
    #[error("failed to connect fetch output to render input: {0}")]
    Pipe(#[source] io::Error),
    #[error("failed to read render diagnostics: {0}")]
    Diagnostics(#[source] io::Error),
    #[error("failed to supervise {stage} stage: {source}")]
    Supervise {
        stage: Stage,
        #[source]
        source: io::Error,
    },
    #[error("progress worker terminated unexpectedly: {0}")]
    Worker(String),
}
