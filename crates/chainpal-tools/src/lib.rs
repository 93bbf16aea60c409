//! Tools exposed to the chat agent.
//!
//! Every tool implements [`Tool`] and returns a structured
//! [`ToolResult`]. Market tools do not fetch data themselves: their result
//! names the `/api/toolcall/...` endpoint the client calls to render the
//! widget. `WebSearch` is the research tool whose output only feeds the
//! model.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use chainpal_core::config::Config;
use chainpal_core::types::ToolResult;

pub mod chart;
pub mod token_holders;
pub mod token_swap;
pub mod top_tokens;
pub mod top_traders;
pub mod wallet_balance;
pub mod web_search;

/// Context provided to tools during execution.
pub struct ToolContext {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl ToolContext {
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search_timeout_secs()))
            .build()?;
        Ok(Self { config, http })
    }
}

/// The capability contract every tool implements.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as exposed to the LLM (e.g. "ChartDetails").
    fn name(&self) -> &str;

    /// JSON Schema describing the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> anyhow::Result<ToolResult>;
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(web_search::WebSearchTool));
        registry.register(Box::new(chart::ChartDetailsTool));
        registry.register(Box::new(top_tokens::TopTokensTool));
        registry.register(Box::new(top_tokens::TrendingTokensTool));
        registry.register(Box::new(token_holders::TokenHoldersTool));
        registry.register(Box::new(top_traders::TopTradersTool));
        registry.register(Box::new(wallet_balance::WalletBalanceTool));
        registry.register(Box::new(token_swap::TokenSwapTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Deserialize tool parameters into the tool's typed struct.
pub(crate) fn parse_params<T: DeserializeOwned>(
    tool: &str,
    params: serde_json::Value,
) -> anyhow::Result<T> {
    serde_json::from_value(params).with_context(|| format!("invalid parameters for {tool}"))
}

/// Reject blank addresses before they reach the client.
pub(crate) fn require_address(field: &str, value: &str) -> anyhow::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{field} must not be empty");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
pub(crate) fn test_context() -> ToolContext {
    ToolContext {
        config: Arc::new(Config::default()),
        http: reqwest::Client::new(),
    }
}
