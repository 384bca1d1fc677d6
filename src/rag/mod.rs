//! 知识库检索（RAG）
//!
//! GET {base}/search?q=...，取前 top_hits 条 hit 的 content 前缀拼接为上下文；
//! 任何失败（网络、超时、响应格式）降级为空串并告警，绝不拖垮任务。

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::RagSection;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    content: String,
}

/// 检索客户端：把任务文本变成一段有界的上下文
pub struct ContextRetriever {
    client: Client,
    base_url: String,
    snippet_chars: usize,
    top_hits: usize,
}

impl ContextRetriever {
    pub fn new(cfg: &RagSection) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            snippet_chars: cfg.snippet_chars,
            top_hits: cfg.top_hits,
        }
    }

    /// 检索上下文；失败时返回空串
    pub async fn retrieve(&self, query: &str) -> String {
        tracing::info!(query = %query, "rag search");
        match self.search(query).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!("rag failed: {}", e);
                String::new()
            }
        }
    }

    async fn search(&self, query: &str) -> Result<String, String> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let body: SearchResponse = resp.json().await.map_err(|e| e.to_string())?;
        tracing::info!("rag returned {} hits", body.hits.len());
        let context = body
            .hits
            .iter()
            .take(self.top_hits)
            .map(|h| h.content.chars().take(self.snippet_chars).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(context)
    }
}
