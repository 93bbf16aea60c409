//! Canned replies for fixed inputs.
//!
//! An exact match on the latest turn's raw text short-circuits the agent and
//! streams the configured output word by word.

use std::collections::HashMap;
use std::time::Duration;

use futures::{Stream, StreamExt};

use chainpal_core::config::MockConfig;

#[derive(Debug, Clone, Default)]
pub struct MockResponder {
    responses: HashMap<String, String>,
    word_delay: Duration,
}

impl MockResponder {
    pub fn new(responses: HashMap<String, String>, word_delay: Duration) -> Self {
        Self {
            responses,
            word_delay,
        }
    }

    pub fn from_config(config: &MockConfig) -> Self {
        let responses = config
            .responses
            .iter()
            .map(|r| (r.input.clone(), r.output.clone()))
            .collect();
        Self::new(responses, Duration::from_millis(config.word_delay_ms))
    }

    /// Exact, whitespace-sensitive lookup.
    pub fn lookup(&self, input: &str) -> Option<&str> {
        self.responses.get(input).map(String::as_str)
    }

    /// Stream the canned reply for `input`, if any.
    pub fn respond(&self, input: &str) -> Option<impl Stream<Item = String> + Send + use<>> {
        let output = self.lookup(input)?;
        Some(word_stream(output, self.word_delay))
    }
}

/// Split `text` into `"word "` chunks, pausing `delay` before each one.
pub fn word_stream(text: &str, delay: Duration) -> impl Stream<Item = String> + Send + use<> {
    let words: Vec<String> = text.split_whitespace().map(|w| format!("{w} ")).collect();
    futures::stream::iter(words).then(move |word| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        word
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        let responder = MockResponder::from_config(&MockConfig::default());
        assert!(responder.lookup("  how to buy bitcoin").is_some());
        assert!(responder.lookup("how to buy bitcoin").is_none());
        assert!(responder.lookup("  how to buy bitcoin ").is_none());
    }

    #[tokio::test]
    async fn test_canned_reply_streams_word_by_word() {
        let config = MockConfig {
            word_delay_ms: 0,
            ..Default::default()
        };
        let responder = MockResponder::from_config(&config);
        let chunks: Vec<String> = responder
            .respond("  how to buy bitcoin")
            .unwrap()
            .collect()
            .await;

        let expected = config.responses[0]
            .output
            .split_whitespace()
            .collect::<Vec<_>>();
        assert_eq!(chunks.len(), expected.len());
        assert_eq!(chunks[0], format!("{} ", expected[0]));
        assert_eq!(chunks.concat().trim_end(), expected.join(" "));
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let responder = MockResponder::default();
        assert!(responder.respond("anything").is_none());
    }
}
