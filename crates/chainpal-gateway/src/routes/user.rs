//! Wallet users and their saved chats.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use chainpal_core::store::{Chat, ChatExchange, QaPair, User};

use crate::boundary::logged;
use crate::error::ApiError;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub wallet_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub wallet_id: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            wallet_id: user.wallet_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet_id: String,
}

pub async fn create_user(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<UserCreate>,
) -> Result<Json<UserResponse>, ApiError> {
    logged("create_user", body.wallet_id.clone(), async move {
        info!(wallet_id = %body.wallet_id, "Creating user");
        let user = state.store.create_user(&body.wallet_id).await?;
        Ok(Json(user.into()))
    })
    .await
}

pub async fn get_user(
    State(state): State<Arc<GatewayState>>,
    Path(wallet_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    logged("get_user", wallet_id.clone(), async move {
        match state.store.get_user(&wallet_id).await? {
            Some(user) => Ok(Json(user.into())),
            None => Err(ApiError::not_found("User not found")),
        }
    })
    .await
}

/// Name for a chat about to be created, if one can be generated.
async fn generated_name(state: &GatewayState, wallet_id: &str, exchange: &ChatExchange) -> Option<String> {
    let namer = state.namer.as_ref()?;
    if exchange.name.is_some() {
        return None;
    }
    let is_new = state.store.get_chat(&exchange.uuid).await.ok()?.is_none();
    let owner_exists = state.store.get_user(wallet_id).await.ok()?.is_some();
    if !is_new || !owner_exists {
        return None;
    }
    match namer.name_chat(&exchange.question, &exchange.answer).await {
        Ok(name) if !name.is_empty() => Some(name),
        Ok(_) => None,
        Err(e) => {
            warn!(uuid = %exchange.uuid, error = %format!("{e:#}"), "Chat naming failed");
            None
        }
    }
}

pub async fn save_chat(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WalletQuery>,
    Json(mut exchange): Json<ChatExchange>,
) -> Result<Json<Value>, ApiError> {
    let args = (query.wallet_id.clone(), exchange.uuid.clone());
    logged("save_chat", args, async move {
        info!(wallet_id = %query.wallet_id, uuid = %exchange.uuid, "Saving chat exchange");
        if let Some(name) = generated_name(&state, &query.wallet_id, &exchange).await {
            exchange.name = Some(name);
        }
        state.store.save_exchange(&query.wallet_id, exchange).await?;
        Ok(Json(json!({"status": "ok"})))
    })
    .await
}

pub async fn list_chats(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<Vec<Chat>>, ApiError> {
    logged("list_chats", query.wallet_id.clone(), async move {
        let chats = state.store.list_chats(&query.wallet_id).await?;
        info!(wallet_id = %query.wallet_id, count = chats.len(), "Listed chats");
        Ok(Json(chats))
    })
    .await
}

pub async fn chat_history(
    State(state): State<Arc<GatewayState>>,
    Path(uuid): Path<String>,
) -> Result<Json<Vec<QaPair>>, ApiError> {
    logged("chat_history", uuid.clone(), async move {
        let history = state.store.chat_history(&uuid).await?;
        Ok(Json(history))
    })
    .await
}
