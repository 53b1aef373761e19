use serde::{Deserialize, Serialize};

/// 搜索网关返回给调用方的一条结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    /// 拉流阶段可直接使用的定位符，通常是视频页面 URL。
    pub source_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// 提供方给出的时长文本，例如 `3:45`。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl SearchResult {
    /// 列表中展示的一行文本：`title | url`。
    pub fn display_line(&self) -> String {
        match (&self.channel, &self.duration) {
            (Some(channel), Some(duration)) => format!(
                "{} [{} · {}] | {}",
                self.title, channel, duration, self.source_reference
            ),
            (None, Some(duration)) => {
                format!("{} [{}] | {}", self.title, duration, self.source_reference)
            }
            (Some(channel), None) => {
                format!("{} [{}] | {}", self.title, channel, self.source_reference)
            }
            (None, None) => format!("{} | {}", self.title, self.source_reference),
        }
    }
}

/// 提供方返回的原始记录，尚未经过网关校验。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupEntry {
    pub title: String,
    pub link: String,
    pub channel: Option<String>,
    pub duration: Option<String>,
}

impl LookupEntry {
    pub fn new<T: Into<String>, L: Into<String>>(title: T, link: L) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }
}
