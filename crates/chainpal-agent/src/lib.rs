//! Agent runtime and reply pipeline.
//!
//! The runtime drives a tool-calling model and emits [`AgentEvent`]s. The
//! [`filter::EventFilter`] turns those events into the chunk stream a chat
//! client reads: prose verbatim, plus a bounded number of actionable tool
//! results as one JSON line each.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use chainpal_core::types::{ChatTurn, ToolResult};

pub mod filter;
pub mod mock;
pub mod prompt;
pub mod reply;
pub mod runtime;
pub mod summarizer;

pub use filter::{EventFilter, FilterPolicy};
pub use mock::MockResponder;
pub use reply::{ReplyError, ReplyPipeline, ReplyStream};
pub use runtime::AgentRuntime;

/// Events emitted by the agent runtime during a run, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AgentEvent {
    /// Incremental model output.
    #[serde(rename = "on_chat_model_stream")]
    TextDelta { content: String },

    /// A tool call is about to run.
    #[serde(rename = "on_tool_start")]
    ToolStart {
        name: String,
        input: serde_json::Value,
    },

    /// A tool call completed with a structured result.
    #[serde(rename = "on_tool_end")]
    ToolEnd { name: String, output: ToolResult },

    /// A tool call failed or named an unknown tool.
    #[serde(rename = "on_tool_error")]
    ToolError { name: String, message: String },

    /// Token usage reported by the model for one completion.
    #[serde(rename = "on_usage")]
    Usage {
        input_tokens: u64,
        output_tokens: u64,
    },
}

pub type EventStream = Pin<Box<dyn Stream<Item = anyhow::Result<AgentEvent>> + Send>>;

/// Anything that turns an input and prior turns into an event stream.
pub trait Agent: Send + Sync {
    fn stream_events(&self, input: String, history: Vec<ChatTurn>) -> EventStream;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainpal_core::types::ToolKind;
    use serde_json::json;

    #[test]
    fn test_event_wire_tags() {
        let delta = serde_json::to_value(AgentEvent::TextDelta {
            content: "gm".into(),
        })
        .unwrap();
        assert_eq!(delta["event"], "on_chat_model_stream");

        let end = serde_json::to_value(AgentEvent::ToolEnd {
            name: "TopTokens".into(),
            output: ToolResult::new(ToolKind::TopTokens),
        })
        .unwrap();
        assert_eq!(end["event"], "on_tool_end");
        assert_eq!(end["output"]["type"], "top_tokens");

        let parsed: AgentEvent = serde_json::from_value(json!({
            "event": "on_tool_start",
            "name": "ChartDetails",
            "input": {"mint_address": "abc"}
        }))
        .unwrap();
        assert!(matches!(parsed, AgentEvent::ToolStart { .. }));
    }
}
