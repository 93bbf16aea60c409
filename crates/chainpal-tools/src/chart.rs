//! ChartDetails tool: asks the client to render a candle chart.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chainpal_core::types::{Interval, ToolKind, ToolResult};

use crate::{Tool, ToolContext, parse_params, require_address};

pub const ENDPOINT: &str = "/api/toolcall/market-chart";

pub struct ChartDetailsTool;

#[derive(Deserialize)]
struct Params {
    mint_address: String,
    interval: Option<Interval>,
}

#[async_trait]
impl Tool for ChartDetailsTool {
    fn name(&self) -> &str {
        "ChartDetails"
    }

    fn description(&self) -> &str {
        "Show the price chart of a Solana token. Use when the user asks for a chart, price action, or candles of a token mint address."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let intervals: Vec<&str> = Interval::ALL.iter().map(|i| i.as_str()).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "mint_address": {
                    "type": "string",
                    "description": "Token mint address"
                },
                "interval": {
                    "type": "string",
                    "enum": intervals,
                    "description": "Candle interval (default: 15m)"
                }
            },
            "required": ["mint_address"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _context: &ToolContext,
    ) -> anyhow::Result<ToolResult> {
        let p: Params = parse_params(self.name(), params)?;
        let mint = require_address("mint_address", &p.mint_address)?;
        let interval = p.interval.unwrap_or_default();
        debug!(mint = %mint, %interval, "ChartDetails");

        Ok(ToolResult::new(ToolKind::Chart)
            .with_endpoint(ENDPOINT)
            .with_arg("mint_address", mint.clone())
            .with_arg("interval", interval.as_str())
            .with_text(format!(
                "Here is the {interval} chart for {mint}."
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context;
    use serde_json::json;

    #[tokio::test]
    async fn test_chart_defaults_interval() {
        let result = ChartDetailsTool
            .execute(
                json!({"mint_address": "2Bs4MW8NKBDy6Bsn2RmGLNYNn4ofccVWMHEiRcVvpump"}),
                &test_context(),
            )
            .await
            .unwrap();
        assert_eq!(result.kind, ToolKind::Chart);
        assert_eq!(result.endpoint.as_deref(), Some(ENDPOINT));
        let args = result.args.unwrap();
        assert_eq!(args["mint_address"], "2Bs4MW8NKBDy6Bsn2RmGLNYNn4ofccVWMHEiRcVvpump");
        assert_eq!(args["interval"], "15m");
    }

    #[tokio::test]
    async fn test_chart_null_interval_uses_default() {
        let result = ChartDetailsTool
            .execute(json!({"mint_address": "abc", "interval": null}), &test_context())
            .await
            .unwrap();
        assert_eq!(result.args.unwrap()["interval"], "15m");
    }

    #[tokio::test]
    async fn test_chart_rejects_unknown_interval() {
        let err = ChartDetailsTool
            .execute(json!({"mint_address": "abc", "interval": "2h"}), &test_context())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ChartDetails"));
    }

    #[tokio::test]
    async fn test_chart_requires_mint() {
        assert!(ChartDetailsTool
            .execute(json!({"interval": "1d"}), &test_context())
            .await
            .is_err());
    }
}
