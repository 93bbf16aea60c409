//! TopTraders tool: most active traders of a token over the last day.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chainpal_core::types::{ToolKind, ToolResult};

use crate::{Tool, ToolContext, parse_params, require_address};

pub const ENDPOINT: &str = "/api/toolcall/top-traders";

pub struct TopTradersTool;

#[derive(Deserialize)]
struct Params {
    mint_address: String,
}

#[async_trait]
impl Tool for TopTradersTool {
    fn name(&self) -> &str {
        "TopTraders"
    }

    fn description(&self) -> &str {
        "Show the traders with the highest USD volume in a Solana token over the last 24 hours."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "mint_address": {
                    "type": "string",
                    "description": "Token mint address"
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
        debug!(mint = %mint, "TopTraders");

        Ok(ToolResult::new(ToolKind::TopTraders)
            .with_endpoint(ENDPOINT)
            .with_arg("mint_address", mint.clone())
            .with_text(format!("Here are the top traders of {mint} in the last 24 hours.")))
    }
}
