//! TokenHolders tool: largest holders of a token.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chainpal_core::types::{ToolKind, ToolResult};

use crate::{Tool, ToolContext, parse_params, require_address};

pub const ENDPOINT: &str = "/api/toolcall/top-holders";

pub struct TokenHoldersTool;

#[derive(Deserialize)]
struct Params {
    mint_address: String,
}

#[async_trait]
impl Tool for TokenHoldersTool {
    fn name(&self) -> &str {
        "TokenHolders"
    }

    fn description(&self) -> &str {
        "Show the largest holders of a Solana token and the share of supply each one owns."
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
        debug!(mint = %mint, "TokenHolders");

        Ok(ToolResult::new(ToolKind::TopHolders)
            .with_endpoint(ENDPOINT)
            .with_arg("mint_address", mint.clone())
            .with_text(format!("Here are the top holders of {mint}.")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context;

    #[tokio::test]
    async fn test_holders_result() {
        let result = TokenHoldersTool
            .execute(serde_json::json!({"mint_address": "mint1"}), &test_context())
            .await
            .unwrap();
        assert_eq!(result.kind, ToolKind::TopHolders);
        assert_eq!(result.args.unwrap()["mint_address"], "mint1");
    }
}
