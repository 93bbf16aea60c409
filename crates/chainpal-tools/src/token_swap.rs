//! TokenSwap tool: prepares the client's swap widget.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chainpal_core::types::{ToolKind, ToolResult};

use crate::{Tool, ToolContext, parse_params};

pub struct TokenSwapTool;

#[derive(Deserialize)]
struct Params {
    #[serde(rename = "swapA")]
    swap_a: String,
    #[serde(rename = "swapB")]
    swap_b: String,
    #[serde(default)]
    amount: Option<f64>,
}

#[async_trait]
impl Tool for TokenSwapTool {
    fn name(&self) -> &str {
        "TokenSwap"
    }

    fn description(&self) -> &str {
        "Prepare a token swap interface. swapA is the token sold, swapB the token bought. Only pass amount when the user states one."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "swapA": {
                    "type": "string",
                    "description": "Symbol or mint of the token to sell"
                },
                "swapB": {
                    "type": "string",
                    "description": "Symbol or mint of the token to buy"
                },
                "amount": {
                    "type": "number",
                    "description": "Amount of swapA to sell, if the user gave one"
                }
            },
            "required": ["swapA", "swapB"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _context: &ToolContext,
    ) -> anyhow::Result<ToolResult> {
        let p: Params = parse_params(self.name(), params)?;
        if p.swap_a.trim().is_empty() || p.swap_b.trim().is_empty() {
            anyhow::bail!("swapA and swapB must not be empty");
        }
        debug!(swap_a = %p.swap_a, swap_b = %p.swap_b, amount = ?p.amount, "TokenSwap");

        let mut result = ToolResult::new(ToolKind::Swap)
            .with_arg("swapA", p.swap_a.trim())
            .with_arg("swapB", p.swap_b.trim());
        if let Some(amount) = p.amount {
            result = result.with_arg("amount", amount);
        }
        Ok(result.with_text("I've prepared the swap interface for you."))
    }
}
