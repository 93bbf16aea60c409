//! Gateway shared state.

use std::sync::Arc;

use chainpal_agent::ReplyPipeline;
use chainpal_agent::summarizer::ChatNamer;
use chainpal_core::config::Config;
use chainpal_core::store::ChatStore;
use chainpal_market::MarketData;

/// Shared state handed to every handler.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub replies: ReplyPipeline,
    pub store: Arc<dyn ChatStore>,
    pub market: Arc<dyn MarketData>,
    /// Titles new chats saved without a name.
    pub namer: Option<ChatNamer>,
    #[cfg(feature = "metrics")]
    pub metrics: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl GatewayState {
    pub fn new(
        config: Arc<Config>,
        replies: ReplyPipeline,
        store: Arc<dyn ChatStore>,
        market: Arc<dyn MarketData>,
    ) -> Self {
        Self {
            config,
            replies,
            store,
            market,
            namer: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    pub fn with_namer(mut self, namer: ChatNamer) -> Self {
        self.namer = Some(namer);
        self
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, handle: metrics_exporter_prometheus::PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
