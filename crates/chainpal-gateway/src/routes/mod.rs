use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::state::GatewayState;

pub mod chat;
pub mod toolcall;
pub mod user;

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/chat/generate", post(chat::generate))
        .route("/api/user/", post(user::create_user))
        .route("/api/user/{wallet_id}", get(user::get_user))
        .route(
            "/api/user/chats/",
            get(user::list_chats).post(user::save_chat),
        )
        .route("/api/user/chats/{uuid}", get(user::chat_history))
        .route("/api/toolcall/market-chart", get(toolcall::market_chart))
        .route(
            "/api/toolcall/pumpfun-top-tokens",
            get(toolcall::pumpfun_top_tokens),
        )
        .route("/api/toolcall/trending-tokens", get(toolcall::trending_tokens))
        .route("/api/toolcall/top-holders", get(toolcall::top_holders))
        .route("/api/toolcall/top-traders", get(toolcall::top_traders))
        .route("/api/toolcall/wallet-balance", get(toolcall::wallet_balance))
}
