use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub client_name: String,
    pub client_version: String,
    pub language: String,
    pub region: String,
    /// 仅返回视频的搜索过滤参数。
    pub filter_params: String,
    pub timeout_ms: u64,
    pub default_limit: usize,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.youtube.com/youtubei/v1/search?prettyPrint=false".to_string(),
            client_name: "WEB".to_string(),
            client_version: "2.20240101.00.00".to_string(),
            language: "en".to_string(),
            region: "US".to_string(),
            filter_params: "EgIQAQ%3D%3D".to_string(),
            timeout_ms: 10_000,
            default_limit: 10,
        }
    }
}
