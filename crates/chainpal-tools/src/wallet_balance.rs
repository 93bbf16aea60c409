//! WalletBalance tool: token balances held by a wallet.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chainpal_core::types::{ToolKind, ToolResult};

use crate::{Tool, ToolContext, parse_params, require_address};

pub const ENDPOINT: &str = "/api/toolcall/wallet-balance";

pub struct WalletBalanceTool;

#[derive(Deserialize)]
struct Params {
    wallet_address: String,
}

#[async_trait]
impl Tool for WalletBalanceTool {
    fn name(&self) -> &str {
        "WalletBalance"
    }

    fn description(&self) -> &str {
        "Show the token balances of a Solana wallet address."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "wallet_address": {
                    "type": "string",
                    "description": "Solana wallet address"
                }
            },
            "required": ["wallet_address"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _context: &ToolContext,
    ) -> anyhow::Result<ToolResult> {
        let p: Params = parse_params(self.name(), params)?;
        let wallet = require_address("wallet_address", &p.wallet_address)?;
        debug!(wallet = %wallet, "WalletBalance");

        Ok(ToolResult::new(ToolKind::WalletBalance)
            .with_endpoint(ENDPOINT)
            .with_arg("wallet_address", wallet.clone())
            .with_text(format!("Here are the balances of wallet {wallet}.")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context;

    #[tokio::test]
    async fn test_wallet_balance_result() {
        let result = WalletBalanceTool
            .execute(serde_json::json!({"wallet_address": "W1"}), &test_context())
            .await
            .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "wallet_balance");
        assert_eq!(value["endpoint"], ENDPOINT);
        assert_eq!(value["args"]["wallet_address"], "W1");
    }
}
