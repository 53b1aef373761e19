//! 观测性初始化：日志写入滚动文件，避免干扰终端界面。

pub mod events;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::dirs_compat;

const LOG_FILE_PREFIX: &str = "tubeplay.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `RUST_LOG` 未设置时使用的过滤规则。
    pub filter: String,
    pub json: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl TelemetryConfig {
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_dir
            .clone()
            .or_else(|| dirs_compat::data_dir().map(|dir| dir.join("tubeplay").join("logs")))
    }
}

/// 安装全局 subscriber。返回的 guard 必须存活到进程退出，否则缓冲中的日志会丢失。
pub fn init_tracing(config: &TelemetryConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (fmt_layer, guard) = match config.resolved_log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = if config.json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed()
            };
            (layer, Some(guard))
        }
        None => {
            let layer = if config.json {
                fmt::layer().json().with_writer(std::io::stderr).boxed()
            } else {
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .boxed()
            };
            (layer, None)
        }
    };

    let subscriber = Registry::default().with(fmt_layer).with(env_filter);
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set global subscriber")?;

    Ok(guard)
}
