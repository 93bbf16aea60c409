//! WebSearch tool: You.com search API wrapper.
//!
//! Research only: its output goes back to the model, never to the client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chainpal_core::types::{ToolKind, ToolResult};

use crate::{Tool, ToolContext, parse_params};

pub struct WebSearchTool;

#[derive(Deserialize)]
struct Params {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
}

fn default_num_results() -> usize {
    5
}

#[derive(Debug, PartialEq)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// Parse You.com `hits`, preferring the first snippet over the description.
fn parse_hits(body: &serde_json::Value, max: usize) -> Vec<SearchHit> {
    let empty = vec![];
    let hits = body["hits"].as_array().unwrap_or(&empty);
    hits.iter()
        .take(max)
        .filter_map(|h| {
            let snippet = h["snippets"]
                .as_array()
                .and_then(|s| s.first())
                .and_then(|s| s.as_str())
                .or_else(|| h["description"].as_str())
                .unwrap_or("");
            Some(SearchHit {
                title: h["title"].as_str()?.to_string(),
                url: h["url"].as_str()?.to_string(),
                snippet: snippet.to_string(),
            })
        })
        .collect()
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No search results found.".to_string();
    }
    let mut output = String::new();
    for (i, h) in hits.iter().enumerate() {
        output.push_str(&format!(
            "{}. **{}**\n   {}\n   {}\n\n",
            i + 1,
            h.title,
            h.url,
            h.snippet
        ));
    }
    output
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "WebSearch"
    }

    fn description(&self) -> &str {
        "Perform a web search for provided search query. Use it for news, project background, and anything not covered by the market tools."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> anyhow::Result<ToolResult> {
        let p: Params = parse_params(self.name(), params)?;
        debug!(query = %p.query, "WebSearch");

        let Some(api_key) = context.config.search_api_key() else {
            anyhow::bail!("search API key is not configured");
        };
        let base_url = context.config.search_api_url();

        let resp = context
            .http
            .get(format!("{}/search", base_url.trim_end_matches('/')))
            .header("X-API-Key", api_key)
            .query(&[("query", p.query.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("Search API returned HTTP {}", resp.status());
        }

        let body: serde_json::Value = resp.json().await?;
        let hits = parse_hits(&body, p.num_results);
        debug!(hits = hits.len(), "WebSearch results");

        Ok(ToolResult::new(ToolKind::Search).with_text(format_hits(&hits)))
    }
}
