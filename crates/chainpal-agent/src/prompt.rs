//! System prompt builder for the agent.

use chainpal_core::config::Config;
use chainpal_tools::ToolRegistry;

const DEFAULT_IDENTITY: &str = "You are Chainpal, a helpful crypto market assistant for the Solana ecosystem.";

const WIDGET_GUIDANCE: &str = "\
Market tools (charts, top tokens, trending tokens, holders, traders, wallet balances, swaps) \
render an interactive widget for the user. Call at most one of them per answer and describe \
what the widget shows instead of inventing numbers. Use WebSearch for news and background; \
its results are only visible to you.";

/// Build the system prompt for the agent.
pub fn build_system_prompt(config: &Config, tools: &ToolRegistry) -> String {
    let mut parts = Vec::new();

    parts.push(config.system_prompt().unwrap_or(DEFAULT_IDENTITY).to_string());

    let now = chrono::Utc::now();
    parts.push(format!("Current time: {}", now.format("%Y-%m-%d %H:%M:%S UTC")));

    let tool_names = tools.list();
    if !tool_names.is_empty() {
        parts.push(format!("Available tools: {}", tool_names.join(", ")));
        parts.push(WIDGET_GUIDANCE.to_string());
    }

    parts.push("Reply in the language the user writes in.".to_string());

    parts.join("\n\n")
}
