//! Agent runtime loop: streams the model, runs requested tools, repeats.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use chainpal_core::config::Config;
use chainpal_core::transcript::{ContentBlock, TranscriptEntry, seed_transcript};
use chainpal_core::types::ChatTurn;
use chainpal_providers::{CompletionRequest, Credentials, LlmProvider, ToolDefinition};
use chainpal_tools::{ToolContext, ToolRegistry};

use crate::prompt::build_system_prompt;
use crate::{Agent, AgentEvent, EventStream};

/// Small so a dropped consumer stops the run within a round or two.
const EVENT_BUFFER: usize = 8;

type EventTx = mpsc::Sender<anyhow::Result<AgentEvent>>;

/// Tool-calling agent backed by an [`LlmProvider`].
#[derive(Clone)]
pub struct AgentRuntime {
    provider: Arc<dyn LlmProvider>,
    credentials: Credentials,
    tools: Arc<ToolRegistry>,
    tool_ctx: Arc<ToolContext>,
    config: Arc<Config>,
}

impl AgentRuntime {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        credentials: Credentials,
        tools: Arc<ToolRegistry>,
        tool_ctx: Arc<ToolContext>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            provider,
            credentials,
            tools,
            tool_ctx,
            config,
        }
    }

    fn tool_definitions(&self) -> Option<Vec<serde_json::Value>> {
        if self.tools.is_empty() {
            return None;
        }
        let definitions: Vec<ToolDefinition> = self
            .tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters_schema: t.parameters_schema(),
            })
            .collect();
        Some(self.provider.format_tools(&definitions))
    }

    /// Run the loop, sending events until done or the receiver is dropped.
    async fn run(&self, input: String, history: Vec<ChatTurn>, tx: &EventTx) -> anyhow::Result<()> {
        let system_prompt = build_system_prompt(&self.config, &self.tools);
        let tool_defs = self.tool_definitions();
        let mut transcript = seed_transcript(&history, &input);
        let max_iterations = self.config.max_tool_iterations();

        for iteration in 0..max_iterations {
            debug!(iteration, "Agent loop iteration");

            let request = CompletionRequest {
                model: self.config.model(),
                messages: self.provider.format_messages(&transcript),
                max_tokens: self.config.max_tokens(),
                temperature: Some(self.config.temperature()),
                tools: tool_defs.clone(),
                system: Some(system_prompt.clone()),
            };

            let mut stream = self.provider.stream(&request, &self.credentials).await?;
            let mut response_text = String::new();
            let mut tool_uses: Vec<(String, String, serde_json::Value)> = Vec::new();
            let mut stop_reason = None;
            let (mut input_tokens, mut output_tokens) = (0, 0);

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                if let Some(delta) = chunk.delta {
                    response_text.push_str(&delta);
                    if !emit(tx, AgentEvent::TextDelta { content: delta }).await {
                        return Ok(());
                    }
                }
                if let Some(tool_use) = chunk.tool_use {
                    let input = serde_json::from_str(&tool_use.input_json).unwrap_or_else(|e| {
                        warn!(tool = %tool_use.name, %e, "Tool arguments are not valid JSON");
                        json!({})
                    });
                    tool_uses.push((tool_use.id, tool_use.name, input));
                }
                if let Some(usage) = chunk.usage {
                    input_tokens = usage.input_tokens.unwrap_or(input_tokens);
                    output_tokens = usage.output_tokens.unwrap_or(output_tokens);
                }
                if let Some(reason) = chunk.stop_reason {
                    stop_reason = Some(reason);
                }
            }

            let mut assistant_content = Vec::new();
            if !response_text.is_empty() {
                assistant_content.push(ContentBlock::Text {
                    text: response_text,
                });
            }
            for (id, name, input) in &tool_uses {
                assistant_content.push(ContentBlock::ToolUse {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                });
            }
            transcript.push(TranscriptEntry::Assistant {
                content: assistant_content,
                timestamp: chrono::Utc::now(),
            });

            let usage = AgentEvent::Usage {
                input_tokens,
                output_tokens,
            };
            if !emit(tx, usage).await {
                return Ok(());
            }

            let wants_tools = !tool_uses.is_empty()
                && stop_reason
                    .as_deref()
                    .is_none_or(|r| self.provider.is_tool_use_stop(r));
            if !wants_tools {
                debug!(iteration, ?stop_reason, "Agent run finished");
                return Ok(());
            }

            for (id, name, input) in tool_uses {
                if !emit(
                    tx,
                    AgentEvent::ToolStart {
                        name: name.clone(),
                        input: input.clone(),
                    },
                )
                .await
                {
                    return Ok(());
                }

                let outcome = match self.tools.get(&name) {
                    Some(tool) => {
                        info!(tool = %name, "Executing tool");
                        tool.execute(input, &self.tool_ctx).await
                    }
                    None => Err(anyhow::anyhow!("Unknown tool: {name}")),
                };

                let (event, entry_content, is_error) = match outcome {
                    Ok(output) => {
                        let content = output.model_content();
                        (AgentEvent::ToolEnd { name: name.clone(), output }, content, false)
                    }
                    Err(e) => {
                        warn!(tool = %name, %e, "Tool execution error");
                        let message = format!("{e:#}");
                        let content = format!("Tool error: {message}");
                        (AgentEvent::ToolError { name: name.clone(), message }, content, true)
                    }
                };

                transcript.push(TranscriptEntry::ToolResult {
                    tool_use_id: id,
                    tool: name,
                    content: entry_content,
                    is_error,
                    timestamp: chrono::Utc::now(),
                });
                if !emit(tx, event).await {
                    return Ok(());
                }
            }
        }

        warn!(max_iterations, "Agent hit the tool iteration limit");
        Ok(())
    }
}

/// Send one event. `false` means the consumer is gone.
async fn emit(tx: &EventTx, event: AgentEvent) -> bool {
    if tx.send(Ok(event)).await.is_err() {
        debug!("Event receiver dropped, stopping agent run");
        return false;
    }
    true
}

impl Agent for AgentRuntime {
    fn stream_events(&self, input: String, history: Vec<ChatTurn>) -> EventStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let runtime = self.clone();
        tokio::spawn(async move {
            if let Err(e) = runtime.run(input, history, &tx).await {
                error!(%e, "Agent run failed");
                let _ = tx.send(Err(e)).await;
            }
        });
        Box::pin(ReceiverStream::new(rx))
    }
}
