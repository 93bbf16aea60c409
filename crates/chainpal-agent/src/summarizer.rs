//! Short chat titles from the opening exchange.

use std::sync::Arc;

use chainpal_core::transcript::TranscriptEntry;
use chainpal_providers::{CompletionRequest, Credentials, LlmProvider};

const NAME_MAX_TOKENS: u32 = 12;

fn naming_prompt(question: &str, answer: &str) -> String {
    format!(
        "Based on the following dialogue, create a short chat name (maximum 12 tokens):\n\n\
         Question: {question}\n\
         Answer: {answer}\n\n\
         Create a very short and informative name that reflects the essence of the conversation.\n\
         The name should be no longer than 12 tokens.\n"
    )
}

/// Names chats with a small, deterministic model call.
#[derive(Clone)]
pub struct ChatNamer {
    provider: Arc<dyn LlmProvider>,
    credentials: Credentials,
    model: String,
}

impl ChatNamer {
    pub fn new(provider: Arc<dyn LlmProvider>, credentials: Credentials, model: String) -> Self {
        Self {
            provider,
            credentials,
            model,
        }
    }

    pub async fn name_chat(&self, question: &str, answer: &str) -> anyhow::Result<String> {
        let messages = self
            .provider
            .format_messages(&[TranscriptEntry::user_text(naming_prompt(question, answer))]);
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: NAME_MAX_TOKENS,
            temperature: Some(0.0),
            tools: None,
            system: None,
        };
        let name = self.provider.complete_text(&request, &self.credentials).await?;
        Ok(name.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chainpal_providers::{ChunkStream, CompletionChunk, ToolDefinition};

    use super::*;

    #[derive(Default)]
    struct EchoProvider {
        last: Mutex<Option<CompletionRequest>>,
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn id(&self) -> &str {
            "echo"
        }

        fn format_tools(&self, _tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
            vec![]
        }

        fn format_messages(&self, transcript: &[TranscriptEntry]) -> Vec<serde_json::Value> {
            transcript
                .iter()
                .map(|e| serde_json::to_value(e).unwrap())
                .collect()
        }

        fn is_tool_use_stop(&self, _stop_reason: &str) -> bool {
            false
        }

        async fn stream(
            &self,
            request: &CompletionRequest,
            _credentials: &Credentials,
        ) -> anyhow::Result<ChunkStream> {
            *self.last.lock().unwrap() = Some(request.clone());
            let chunks = ["  Buying ", "Bitcoin Basics\n"].map(|d| {
                Ok(CompletionChunk {
                    delta: Some(d.to_string()),
                    ..Default::default()
                })
            });
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    #[tokio::test]
    async fn test_name_is_trimmed_and_request_is_bounded() {
        let provider = Arc::new(EchoProvider::default());
        let namer = ChatNamer::new(provider.clone(), Credentials::None, "gpt-4o-mini".into());

        let name = namer
            .name_chat("how do I buy BTC?", "Use an exchange.")
            .await
            .unwrap();
        assert_eq!(name, "Buying Bitcoin Basics");

        let request = provider.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 12);
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.tools.is_none());
        let prompt = request.messages[0].to_string();
        assert!(prompt.contains("Question: how do I buy BTC?"), "got: {prompt}");
    }
}
