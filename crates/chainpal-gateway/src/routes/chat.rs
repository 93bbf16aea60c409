//! `POST /api/chat/generate`: the streamed reply.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use serde::Deserialize;
use tracing::{error, info};

use chainpal_core::types::ChatTurn;

use crate::boundary::logged;
use crate::error::ApiError;
use crate::metrics;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

pub async fn generate(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    logged("generate", request.messages.len(), async move {
        info!(turns = request.messages.len(), "Generating reply");
        let stream = state.replies.stream_reply(request.messages)?;
        metrics::record_stream_opened();

        let stream = stream.inspect_err(|e| {
            error!(%e, "Reply stream aborted");
            metrics::record_error("reply_stream");
        });
        Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(stream),
        )
            .into_response())
    })
    .await
}
