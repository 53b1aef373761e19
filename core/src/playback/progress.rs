//! 渲染阶段诊断输出的时间解析。

use std::time::Duration;

use thiserror::Error;

const TIME_TOKEN: &str = "time=";

/// 诊断行无法提供播放位置时的告警，仅记录日志，不向上传播。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressParseWarning {
    #[error("diagnostic line carries no time= token")]
    MissingToken,
    #[error("unrecognised time token: {token}")]
    Malformed { token: String },
}

/// 从形如 `frame= 12 fps=25 time=00:01:05.20 bitrate=…` 的行中解析已播放时长。
pub fn parse_elapsed(line: &str) -> Result<Duration, ProgressParseWarning> {
    let (_, rest) = line
        .split_once(TIME_TOKEN)
        .ok_or(ProgressParseWarning::MissingToken)?;
    let token = rest.split_whitespace().next().unwrap_or_default();

    parse_clock(token, 3, 3).ok_or_else(|| ProgressParseWarning::Malformed {
        token: token.to_string(),
    })
}

/// 解析搜索结果里的时长文本，例如 `3:45` 或 `1:02:03`。
pub fn parse_clock_duration(text: &str) -> Option<Duration> {
    parse_clock(text.trim(), 1, 3)
}

/// 以总分钟数:秒格式化，例如 65.2 秒 -> `01:05`，超过一小时继续累加分钟。
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// 已知总时长时换算百分比，结果截断在 100 以内。
pub fn progress_percent(elapsed: Duration, expected: Option<Duration>) -> Option<u8> {
    let expected = expected.filter(|total| !total.is_zero())?;
    let ratio = elapsed.as_secs_f64() / expected.as_secs_f64();
    Some((ratio * 100.0).clamp(0.0, 100.0) as u8)
}

fn parse_clock(token: &str, min_parts: usize, max_parts: usize) -> Option<Duration> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() < min_parts || parts.len() > max_parts {
        return None;
    }

    let (last, leading) = parts.split_last()?;
    let mut whole_seconds: u64 = 0;
    for part in leading {
        if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        let value: u64 = part.parse().ok()?;
        whole_seconds = whole_seconds.checked_mul(60)?.checked_add(value)?;
    }

    if last.is_empty() || !last.bytes().all(|byte| byte.is_ascii_digit() || byte == b'.') {
        return None;
    }
    let seconds: f64 = last.parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }

    let total = (whole_seconds.checked_mul(60)? as f64) + seconds;
    Duration::try_from_secs_f64(total).ok()
}
