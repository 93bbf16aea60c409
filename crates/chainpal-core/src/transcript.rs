//! Agent transcript: the message history a tool-calling loop sends to the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChatTurn, Role};

/// Content block in a message (text or tool_use).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// One entry of an agent transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TranscriptEntry {
    #[serde(rename = "user")]
    User {
        content: Vec<ContentBlock>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "assistant")]
    Assistant {
        content: Vec<ContentBlock>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        tool: String,
        content: String,
        is_error: bool,
        timestamp: DateTime<Utc>,
    },
}

impl TranscriptEntry {
    pub fn user_text(text: impl Into<String>) -> Self {
        TranscriptEntry::User {
            content: vec![ContentBlock::Text { text: text.into() }],
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        TranscriptEntry::Assistant {
            content: vec![ContentBlock::Text { text: text.into() }],
            timestamp: Utc::now(),
        }
    }
}

impl From<&ChatTurn> for TranscriptEntry {
    fn from(turn: &ChatTurn) -> Self {
        match turn.role {
            Role::User => TranscriptEntry::user_text(turn.content.clone()),
            Role::Assistant => TranscriptEntry::assistant_text(turn.content.clone()),
        }
    }
}

/// Build the starting transcript for one reply: prior turns then the new input.
pub fn seed_transcript(history: &[ChatTurn], input: &str) -> Vec<TranscriptEntry> {
    history
        .iter()
        .map(TranscriptEntry::from)
        .chain(std::iter::once(TranscriptEntry::user_text(input)))
        .collect()
}
