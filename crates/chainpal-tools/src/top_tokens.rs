//! TopTokens and TrendingTokens tools: token leaderboards without parameters.

use async_trait::async_trait;
use tracing::debug;

use chainpal_core::types::{ToolKind, ToolResult};

use crate::{Tool, ToolContext};

pub const TOP_TOKENS_ENDPOINT: &str = "/api/toolcall/pumpfun-top-tokens";
pub const TRENDING_TOKENS_ENDPOINT: &str = "/api/toolcall/trending-tokens";

fn no_params_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

pub struct TopTokensTool;

#[async_trait]
impl Tool for TopTokensTool {
    fn name(&self) -> &str {
        "TopTokens"
    }

    fn description(&self) -> &str {
        "Show the top pump.fun tokens. Use when the user asks about top, best, or hottest pump.fun tokens."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        no_params_schema()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _context: &ToolContext,
    ) -> anyhow::Result<ToolResult> {
        debug!("TopTokens");
        Ok(ToolResult::new(ToolKind::TopTokens)
            .with_endpoint(TOP_TOKENS_ENDPOINT)
            .with_text("Here are the top pump.fun tokens right now."))
    }
}

pub struct TrendingTokensTool;

#[async_trait]
impl Tool for TrendingTokensTool {
    fn name(&self) -> &str {
        "TrendingTokens"
    }

    fn description(&self) -> &str {
        "Show the Solana tokens with the highest trading volume over the last hour."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        no_params_schema()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _context: &ToolContext,
    ) -> anyhow::Result<ToolResult> {
        debug!("TrendingTokens");
        Ok(ToolResult::new(ToolKind::TrendingTokens)
            .with_endpoint(TRENDING_TOKENS_ENDPOINT)
            .with_text("Here are the trending Solana tokens of the last hour."))
    }
}
