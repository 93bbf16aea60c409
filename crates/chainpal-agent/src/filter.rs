//! Reply stream filter.
//!
//! Consumes agent events one at a time and yields client chunks:
//! non-empty text deltas verbatim, and actionable tool results as
//! `{"tool": name, ...result}` JSON lines while the per-stream budget
//! lasts. Tool starts, research tool results, usage, and tool errors never
//! reach the client.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures::Stream;
use pin_project_lite::pin_project;
use serde::Serialize;
use tracing::{debug, warn};

use chainpal_core::config::Config;
use chainpal_core::types::ToolResult;

use crate::AgentEvent;
use crate::reply::ReplyError;

/// Forwarding rules shared by every stream.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    /// Actionable tool results forwarded per stream. 0 disables forwarding.
    pub max_tools: usize,
    /// Tools whose results only feed the model.
    pub research_tools: HashSet<String>,
}

impl FilterPolicy {
    pub fn new<I, S>(max_tools: usize, research_tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_tools,
            research_tools: research_tools.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_num_of_tools(), config.research_tools())
    }

    pub fn is_research(&self, tool: &str) -> bool {
        self.research_tools.contains(tool)
    }
}

/// Per-stream filter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub tools_forwarded: usize,
}

#[derive(Serialize)]
struct ToolEnvelope<'a> {
    tool: &'a str,
    #[serde(flatten)]
    result: &'a ToolResult,
}

type Encoder = fn(&str, &ToolResult) -> serde_json::Result<String>;

/// Serialize a tool result as one newline-terminated JSON line.
pub fn encode_envelope(tool: &str, result: &ToolResult) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(&ToolEnvelope { tool, result })?;
    line.push('\n');
    Ok(line)
}

impl FilterState {
    /// Apply the forwarding rules to one event.
    pub fn process(&mut self, policy: &FilterPolicy, event: AgentEvent) -> Option<String> {
        self.process_with(policy, event, encode_envelope)
    }

    fn process_with(
        &mut self,
        policy: &FilterPolicy,
        event: AgentEvent,
        encode: Encoder,
    ) -> Option<String> {
        match event {
            AgentEvent::TextDelta { content } if !content.is_empty() => Some(content),
            AgentEvent::ToolEnd { name, output } => {
                if policy.is_research(&name) {
                    debug!(tool = %name, "Dropping research tool result");
                    return None;
                }
                if self.tools_forwarded >= policy.max_tools {
                    debug!(tool = %name, max = policy.max_tools, "Tool budget spent, dropping result");
                    return None;
                }
                match encode(&name, &output) {
                    Ok(line) => {
                        self.tools_forwarded += 1;
                        Some(line)
                    }
                    Err(e) => {
                        warn!(tool = %name, %e, "Failed to serialize tool result, dropping it");
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

pin_project! {
    /// Stream adapter applying [`FilterState::process`] to an event stream.
    ///
    /// An upstream error is yielded once, after which the stream ends.
    pub struct EventFilter<S> {
        #[pin]
        upstream: S,
        policy: Arc<FilterPolicy>,
        state: FilterState,
        encode: Encoder,
        done: bool,
    }
}

impl<S> EventFilter<S> {
    pub fn new(upstream: S, policy: Arc<FilterPolicy>) -> Self {
        Self::with_encoder(upstream, policy, encode_envelope)
    }

    fn with_encoder(upstream: S, policy: Arc<FilterPolicy>, encode: Encoder) -> Self {
        Self {
            upstream,
            policy,
            state: FilterState::default(),
            encode,
            done: false,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }
}

impl<S> Stream for EventFilter<S>
where
    S: Stream<Item = anyhow::Result<AgentEvent>>,
{
    type Item = Result<String, ReplyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.upstream.as_mut().poll_next(cx)) {
                Some(Ok(event)) => {
                    if let Some(chunk) = this.state.process_with(this.policy, event, *this.encode)
                    {
                        return Poll::Ready(Some(Ok(chunk)));
                    }
                }
                Some(Err(e)) => {
                    warn!(%e, "Agent stream failed mid-reply");
                    *this.done = true;
                    return Poll::Ready(Some(Err(ReplyError::Upstream(e))));
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}
