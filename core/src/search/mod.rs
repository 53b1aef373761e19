//! 搜索网关：把自由文本查询委托给外部检索服务，按原顺序返回标题与来源引用。

mod provider;

pub mod config;
pub mod error;
pub mod types;

pub use config::SearchConfig;
pub use error::LookupError;
pub use provider::{InnertubeProvider, LookupProvider};
pub use types::{LookupEntry, SearchResult};

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::telemetry::events::{record_search_completed, record_search_failed};

pub struct SearchGateway {
    provider: Arc<dyn LookupProvider>,
    default_limit: usize,
}

impl SearchGateway {
    pub fn new(config: SearchConfig) -> Self {
        let default_limit = config.default_limit;
        Self::with_provider(Arc::new(InnertubeProvider::new(config)), default_limit)
    }

    pub fn with_provider(provider: Arc<dyn LookupProvider>, default_limit: usize) -> Self {
        Self {
            provider,
            default_limit,
        }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// 结果保持提供方顺序，数量不超过 `limit`。
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        if limit == 0 {
            return Err(LookupError::InvalidLimit);
        }

        let started = Instant::now();
        let outcome = self
            .provider
            .lookup(query, limit)
            .await
            .and_then(|entries| into_results(entries, limit));

        match &outcome {
            Ok(results) => {
                info!(
                    target: "search_gateway",
                    results = results.len(),
                    limit,
                    "search completed"
                );
                record_search_completed(query, limit, results.len(), started.elapsed());
            }
            Err(err) => {
                warn!(target: "search_gateway", %err, "search failed");
                record_search_failed(query, err, started.elapsed());
            }
        }

        outcome
    }
}

fn into_results(entries: Vec<LookupEntry>, limit: usize) -> Result<Vec<SearchResult>, LookupError> {
    entries
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| {
            let title = entry.title.trim();
            let link = entry.link.trim();
            if title.is_empty() || link.is_empty() {
                return Err(LookupError::Malformed(format!(
                    "entry {index} is missing its title or link"
                )));
            }
            Ok(SearchResult {
                title: title.to_string(),
                source_reference: link.to_string(),
                channel: entry.channel,
                duration: entry.duration,
            })
        })
        .collect()
}
