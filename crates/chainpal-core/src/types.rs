use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// UI action a tool result asks the client to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Search,
    Chart,
    TopTokens,
    TrendingTokens,
    TopHolders,
    TopTraders,
    WalletBalance,
    Swap,
}

/// Structured output of a tool call.
///
/// Forwarded to the client verbatim (inside the tool envelope) when the
/// tool is actionable and the forwarding budget allows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(rename = "type")]
    pub kind: ToolKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,

    #[serde(rename = "textResponse", skip_serializing_if = "Option::is_none")]
    pub text_response: Option<String>,
}

impl ToolResult {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            endpoint: None,
            args: None,
            text_response: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_response = Some(text.into());
        self
    }

    /// Content handed back to the model as the tool message.
    pub fn model_content(&self) -> String {
        match &self.text_response {
            Some(text) => text.clone(),
            None => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

/// Candle interval codes accepted by the chart tool and endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[default]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl Interval {
    pub const ALL: [Interval; 9] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::OneDay,
        Interval::ThreeDays,
        Interval::SevenDays,
        Interval::ThirtyDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::OneDay => "1d",
            Interval::ThreeDays => "3d",
            Interval::SevenDays => "7d",
            Interval::ThirtyDays => "30d",
        }
    }

    /// Bitquery `OLAP_DateTimeInterval` unit for this interval.
    pub fn time_unit(&self) -> &'static str {
        match self {
            Interval::OneMinute
            | Interval::FiveMinutes
            | Interval::FifteenMinutes
            | Interval::ThirtyMinutes
            | Interval::SixtyMinutes => "minutes",
            Interval::OneDay | Interval::ThreeDays | Interval::SevenDays | Interval::ThirtyDays => {
                "days"
            }
        }
    }

    pub fn time_count(&self) -> u32 {
        match self {
            Interval::OneMinute | Interval::OneDay => 1,
            Interval::ThreeDays => 3,
            Interval::FiveMinutes => 5,
            Interval::SevenDays => 7,
            Interval::FifteenMinutes => 15,
            Interval::ThirtyMinutes | Interval::ThirtyDays => 30,
            Interval::SixtyMinutes => 60,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interval code: {0}")]
pub struct UnknownInterval(pub String);

impl FromStr for Interval {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownInterval(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_turn_wire_format() {
        let turn: ChatTurn =
            serde_json::from_value(json!({"role": "assistant", "content": "gm"})).unwrap();
        assert_eq!(turn, ChatTurn::assistant("gm"));

        let bad = serde_json::from_value::<ChatTurn>(json!({"role": "system", "content": "x"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_tool_result_skips_missing_fields() {
        let result = ToolResult::new(ToolKind::Swap)
            .with_arg("swapA", "BTC")
            .with_arg("swapB", "SOL")
            .with_text("I've prepared the swap interface");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "swap");
        assert_eq!(value["args"]["swapA"], "BTC");
        assert_eq!(value["textResponse"], "I've prepared the swap interface");
        assert!(value.get("endpoint").is_none());
        assert!(value["args"].get("amount").is_none());
    }

    #[test]
    fn test_model_content_prefers_text() {
        let with_text = ToolResult::new(ToolKind::Search).with_text("1. result");
        assert_eq!(with_text.model_content(), "1. result");

        let without = ToolResult::new(ToolKind::TopTokens).with_endpoint("/api/x");
        assert!(without.model_content().contains("\"endpoint\":\"/api/x\""));
    }

    #[test]
    fn test_interval_codes() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::OneDay);
        assert_eq!(Interval::SixtyMinutes.time_unit(), "minutes");
        assert_eq!(Interval::SixtyMinutes.time_count(), 60);
        assert_eq!(Interval::SevenDays.time_unit(), "days");
        assert!("2h".parse::<Interval>().is_err());
        assert_eq!(
            serde_json::to_string(&Interval::ThirtyDays).unwrap(),
            "\"30d\""
        );
        for interval in Interval::ALL {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), interval);
        }
    }
}
