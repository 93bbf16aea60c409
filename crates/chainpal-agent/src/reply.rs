//! Reply pipeline: mock lookup, then agent events through the filter.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use chainpal_core::config::Config;
use chainpal_core::types::ChatTurn;

use crate::Agent;
use crate::filter::{EventFilter, FilterPolicy};
use crate::mock::MockResponder;

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// Rejected before any output was produced.
    #[error("{0}")]
    InvalidInput(String),

    /// The agent failed while the reply was streaming.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, ReplyError>> + Send>>;

pub struct ReplyPipeline {
    agent: Arc<dyn Agent>,
    mock: MockResponder,
    policy: Arc<FilterPolicy>,
}

impl ReplyPipeline {
    pub fn new(agent: Arc<dyn Agent>, mock: MockResponder, policy: FilterPolicy) -> Self {
        Self {
            agent,
            mock,
            policy: Arc::new(policy),
        }
    }

    pub fn from_config(agent: Arc<dyn Agent>, config: &Config) -> Self {
        Self::new(
            agent,
            MockResponder::from_config(&config.mock()),
            FilterPolicy::from_config(config),
        )
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Start streaming a reply to the last turn, using earlier turns as history.
    pub fn stream_reply(&self, mut turns: Vec<ChatTurn>) -> Result<ReplyStream, ReplyError> {
        let Some(latest) = turns.pop() else {
            return Err(ReplyError::InvalidInput("Messages list is empty".into()));
        };

        if let Some(words) = self.mock.respond(&latest.content) {
            info!("Serving canned reply");
            return Ok(Box::pin(words.map(Ok)));
        }

        debug!(history = turns.len(), "Starting agent reply");
        let events = self.agent.stream_events(latest.content, turns);
        Ok(Box::pin(EventFilter::new(events, self.policy.clone())))
    }
}
