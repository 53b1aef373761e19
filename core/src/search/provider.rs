use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::config::SearchConfig;
use super::error::LookupError;
use super::types::LookupEntry;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
const USER_AGENT: &str = concat!("tubeplay/", env!("CARGO_PKG_VERSION"));

/// 外部检索服务。实现方只负责取回原始记录，校验与截断由网关完成。
#[async_trait]
pub trait LookupProvider: Send + Sync {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<LookupEntry>, LookupError>;
}

/// 通过视频平台网页端搜索接口检索。
#[derive(Clone)]
pub struct InnertubeProvider {
    config: SearchConfig,
    agent: ureq::Agent,
}

impl std::fmt::Debug for InnertubeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InnertubeProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InnertubeProvider {
    pub fn new(config: SearchConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build();
        Self { config, agent }
    }

    fn request_body(&self, query: &str) -> Value {
        json!({
            "context": {
                "client": {
                    "clientName": self.config.client_name,
                    "clientVersion": self.config.client_version,
                    "hl": self.config.language,
                    "gl": self.config.region,
                }
            },
            "query": query,
            "params": self.config.filter_params,
        })
    }

    fn fetch_blocking(&self, query: &str) -> Result<String, LookupError> {
        let body = self.request_body(query).to_string();
        let response = self
            .agent
            .post(&self.config.endpoint)
            .set("Content-Type", "application/json")
            .send_string(&body);

        match response {
            Ok(response) => response
                .into_string()
                .map_err(|err| LookupError::Malformed(err.to_string())),
            Err(ureq::Error::Status(status, _)) => Err(LookupError::Status { status }),
            Err(ureq::Error::Transport(transport)) => {
                Err(LookupError::Unreachable(transport.to_string()))
            }
        }
    }
}

#[async_trait]
impl LookupProvider for InnertubeProvider {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<LookupEntry>, LookupError> {
        let provider = self.clone();
        let owned_query = query.to_string();
        let body = tokio::task::spawn_blocking(move || provider.fetch_blocking(&owned_query))
            .await
            .map_err(|err| LookupError::Unreachable(err.to_string()))??;

        debug!(
            target: "search_gateway",
            bytes = body.len(),
            "search provider answered"
        );
        parse_search_document(&body, limit)
    }
}

/// 按文档顺序收集所有 `videoRenderer` 节点。
pub(crate) fn parse_search_document(
    body: &str,
    limit: usize,
) -> Result<Vec<LookupEntry>, LookupError> {
    let document: Value =
        serde_json::from_str(body).map_err(|err| LookupError::Malformed(err.to_string()))?;

    let contents = document
        .get("contents")
        .ok_or_else(|| LookupError::Malformed("response has no contents".to_string()))?;

    let mut entries = Vec::new();
    collect_video_renderers(contents, limit, &mut entries);
    Ok(entries)
}

fn collect_video_renderers(node: &Value, limit: usize, entries: &mut Vec<LookupEntry>) {
    if entries.len() >= limit {
        return;
    }

    match node {
        Value::Object(map) => {
            if let Some(renderer) = map.get("videoRenderer") {
                if let Some(entry) = entry_from_renderer(renderer) {
                    entries.push(entry);
                }
                return;
            }
            for child in map.values() {
                collect_video_renderers(child, limit, entries);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_video_renderers(item, limit, entries);
            }
        }
        _ => {}
    }
}

fn entry_from_renderer(renderer: &Value) -> Option<LookupEntry> {
    let video_id = renderer.get("videoId")?.as_str()?;
    let title = renderer.get("title").and_then(text_of)?;

    Some(LookupEntry {
        title,
        link: format!("{WATCH_URL_PREFIX}{video_id}"),
        channel: renderer
            .get("ownerText")
            .or_else(|| renderer.get("longBylineText"))
            .and_then(text_of),
        duration: renderer.get("lengthText").and_then(text_of),
    })
}

/// 文本字段有 `simpleText` 与 `runs[].text` 两种形式。
fn text_of(value: &Value) -> Option<String> {
    if let Some(simple) = value.get("simpleText").and_then(Value::as_str) {
        return Some(simple.to_string());
    }

    let runs = value.get("runs")?.as_array()?;
    let text: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, title: &str, length: Option<&str>) -> Value {
        let mut renderer = json!({
            "videoId": id,
            "title": { "runs": [{ "text": title }] },
            "ownerText": { "runs": [{ "text": "Channel" }] },
        });
        if let Some(length) = length {
            renderer["lengthText"] = json!({ "simpleText": length });
        }
        json!({ "videoRenderer": renderer })
    }

    fn document(items: Vec<Value>) -> String {
        json!({
            "contents": {
                "twoColumnSearchResultsRenderer": {
                    "primaryContents": {
                        "sectionListRenderer": {
                            "contents": [
                                { "itemSectionRenderer": { "contents": items } },
                                { "continuationItemRenderer": { "trigger": "CONTINUATION_TRIGGER_ON_ITEM_SHOWN" } }
                            ]
                        }
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn collects_videos_in_document_order() {
        let body = document(vec![
            video("a1", "First", Some("3:45")),
            json!({ "channelRenderer": { "channelId": "UC123" } }),
            json!({ "shelfRenderer": { "content": { "verticalListRenderer": {
                "items": [video("b2", "Shelved", None)]
            } } } }),
            video("c3", "Third", Some("1:02:03")),
        ]);

        let entries = parse_search_document(&body, 10).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Shelved", "Third"]);
        assert_eq!(entries[0].link, "https://www.youtube.com/watch?v=a1");
        assert_eq!(entries[0].duration.as_deref(), Some("3:45"));
        assert_eq!(entries[0].channel.as_deref(), Some("Channel"));
        assert_eq!(entries[1].duration, None);
    }

    #[test]
    fn sibling_sections_keep_document_order() {
        let body = r#"{"contents":{
            "zetaSection":{"videoRenderer":{"videoId":"z","title":{"simpleText":"Zeta"}}},
            "alphaSection":{"videoRenderer":{"videoId":"a","title":{"simpleText":"Alpha"}}}
        }}"#;
        let entries = parse_search_document(body, 10).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn stops_at_limit() {
        let body = document(vec![
            video("a", "A", None),
            video("b", "B", None),
            video("c", "C", None),
        ]);
        let entries = parse_search_document(&body, 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].title, "B");
    }

    #[test]
    fn renderers_without_id_are_skipped() {
        let body = document(vec![
            json!({ "videoRenderer": { "title": { "simpleText": "No id" } } }),
            video("ok", "Playable", None),
        ]);
        let entries = parse_search_document(&body, 10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Playable");
    }

    #[test]
    fn malformed_payloads_are_errors() {
        assert!(matches!(
            parse_search_document("<html>", 10),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            parse_search_document("{\"responseContext\":{}}", 10),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn request_body_carries_query_and_filter() {
        let provider = InnertubeProvider::new(SearchConfig::default());
        let body = provider.request_body("lofi beats");
        assert_eq!(body["query"], "lofi beats");
        assert_eq!(body["params"], "EgIQAQ%3D%3D");
        assert_eq!(body["context"]["client"]["clientName"], "WEB");
    }
}
