//! Axum HTTP server.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::routes::api_routes;
use crate::state::GatewayState;

/// Build the full router: `/api` routes, `/health`, and `/metrics` when enabled.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api_routes());

    #[cfg(feature = "metrics")]
    let router = router
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn(track_requests));

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until Ctrl-C.
pub async fn start_gateway(state: Arc<GatewayState>, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{port}", state.config.gateway_bind());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(feature = "metrics")]
async fn metrics_handler(
    axum::extract::State(state): axum::extract::State<Arc<GatewayState>>,
) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => axum::http::StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(feature = "metrics")]
async fn track_requests(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let route = request
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let start = std::time::Instant::now();
    let response = next.run(request).await;
    crate::metrics::record_request(
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(%e, "Failed to listen for Ctrl-C, shutting down only on process exit");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use chainpal_agent::{
        Agent, AgentEvent, EventStream, FilterPolicy, MockResponder, ReplyPipeline,
    };
    use chainpal_core::config::Config;
    use chainpal_core::store::JsonChatStore;
    use chainpal_core::types::{ChatTurn, Interval, ToolKind, ToolResult};
    use chainpal_market::types::{Account, Holder, HoldersData};
    use chainpal_market::{
        ChartData, MarketData, MarketError, PumpFunTrade, TrendingToken, WalletBalance,
    };

    use super::*;

    struct ChartAgent;

    impl Agent for ChartAgent {
        fn stream_events(&self, _input: String, _history: Vec<ChatTurn>) -> EventStream {
            let events = vec![
                AgentEvent::TextDelta {
                    content: "Here's ".into(),
                },
                AgentEvent::ToolEnd {
                    name: "ChartDetails".into(),
                    output: ToolResult::new(ToolKind::Chart).with_arg("mint_address", "abc"),
                },
                AgentEvent::TextDelta {
                    content: "chart".into(),
                },
                AgentEvent::ToolEnd {
                    name: "WebSearch".into(),
                    output: ToolResult::new(ToolKind::Search).with_text("secret research"),
                },
            ];
            Box::pin(futures::stream::iter(events.into_iter().map(Ok::<_, anyhow::Error>)))
        }
    }

    #[derive(Default)]
    struct FakeMarket {
        chart_calls: Mutex<Vec<(String, Interval)>>,
    }

    #[async_trait]
    impl MarketData for FakeMarket {
        async fn chart(
            &self,
            mint_address: &str,
            interval: Interval,
        ) -> Result<ChartData, MarketError> {
            self.chart_calls
                .lock()
                .unwrap()
                .push((mint_address.to_string(), interval));
            Ok(ChartData {
                candles: vec![],
                token: None,
            })
        }

        async fn pumpfun_top_tokens(&self) -> Result<Vec<PumpFunTrade>, MarketError> {
            Ok(vec![])
        }

        async fn trending_tokens(&self) -> Result<Vec<TrendingToken>, MarketError> {
            Err(MarketError::Status {
                status: 429,
                body: "rate limited".into(),
            })
        }

        async fn top_traders(
            &self,
            _mint_address: &str,
        ) -> Result<Vec<serde_json::Value>, MarketError> {
            Ok(vec![json!({"Trade": {"Account": {"Owner": "trader"}}})])
        }

        async fn top_holders(&self, _mint_address: &str) -> Result<HoldersData, MarketError> {
            Ok(HoldersData {
                supply: None,
                holders: vec![Holder {
                    account: Account {
                        owner: "whale".into(),
                    },
                    balance: "10".into(),
                    percentage_owned: 0.0,
                }],
            })
        }

        async fn wallet_balance(
            &self,
            _wallet_address: &str,
        ) -> Result<Vec<WalletBalance>, MarketError> {
            Ok(vec![])
        }
    }

    fn test_app(dir: &TempDir) -> (Router, Arc<FakeMarket>) {
        let replies = ReplyPipeline::new(
            Arc::new(ChartAgent),
            MockResponder::new(
                HashMap::from([("  gm".to_string(), "gm fren".to_string())]),
                Duration::ZERO,
            ),
            FilterPolicy::new(1, ["WebSearch"]),
        );
        let market = Arc::new(FakeMarket::default());
        let state = GatewayState::new(
            Arc::new(Config::default()),
            replies,
            Arc::new(JsonChatStore::new(dir.path().to_path_buf())),
            market.clone(),
        );
        (build_router(Arc::new(state)), market)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[cfg(feature = "metrics")]
    #[tokio::test]
    async fn test_metrics_without_recorder_is_not_found() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_streams_text_and_one_tool_line() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/chat/generate",
                json!({"messages": [{"role": "user", "content": "chart abc"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"), "got: {content_type}");

        let body = body_text(response).await;
        assert!(body.starts_with("Here's {\"tool\":\"ChartDetails\""), "got: {body}");
        assert!(body.ends_with("}\nchart"), "got: {body}");
        assert!(!body.contains("secret research"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_messages() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let response = app
            .oneshot(json_request("POST", "/api/chat/generate", json!({"messages": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Messages list is empty");
    }

    #[tokio::test]
    async fn test_generate_serves_canned_reply() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/chat/generate",
                json!({"messages": [{"role": "user", "content": "  gm"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "gm fren ");
    }

    #[tokio::test]
    async fn test_user_and_chat_flow() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/user/", json!({"wallet_id": "w1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let user = body_json(response).await;
        assert_eq!(user["wallet_id"], "w1");
        assert!(user["id"].is_u64());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/user/", json!({"wallet_id": "w1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "User with this wallet_id already exists"
        );

        let response = app.clone().oneshot(get("/api/user/nobody")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["detail"], "User not found");

        let exchange = json!({"uuid": "chat-1", "question": "gm?", "answer": "gm!"});
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/user/chats/?wallet_id=w1", exchange))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = app
            .clone()
            .oneshot(get("/api/user/chats/?wallet_id=w1"))
            .await
            .unwrap();
        let chats = body_json(response).await;
        assert_eq!(chats[0]["uuid"], "chat-1");
        assert_eq!(chats[0]["name"], "New Chat");

        let response = app.clone().oneshot(get("/api/user/chats/chat-1")).await.unwrap();
        let history = body_json(response).await;
        assert_eq!(history[0]["question"], "gm?");
        assert_eq!(history[0]["answer"], "gm!");

        let response = app.oneshot(get("/api/user/chats/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["detail"], "Chat not found");
    }

    #[tokio::test]
    async fn test_save_chat_for_unknown_wallet() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/user/chats/?wallet_id=ghost",
                json!({"uuid": "c", "question": "q", "answer": "a"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_toolcall_routes() {
        let dir = TempDir::new().unwrap();
        let (app, market) = test_app(&dir);

        let response = app
            .clone()
            .oneshot(get("/api/toolcall/market-chart?mint_address=abc&interval=1d"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["data"]["candles"].is_array());
        assert_eq!(
            market.chart_calls.lock().unwrap()[0],
            ("abc".to_string(), "1d".parse().unwrap())
        );

        let response = app
            .clone()
            .oneshot(get("/api/toolcall/market-chart?mint_address=abc&interval=2h"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Invalid interval parameter");

        let response = app
            .clone()
            .oneshot(get("/api/toolcall/top-holders?mint_address=abc"))
            .await
            .unwrap();
        let holders = body_json(response).await;
        assert_eq!(holders["data"]["Top_holders"][0]["Account"]["Owner"], "whale");

        let response = app
            .clone()
            .oneshot(get("/api/toolcall/top-traders?mint_address=abc"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["data"][0]["Trade"]["Account"]["Owner"], "trader");

        let response = app
            .oneshot(get("/api/toolcall/trending-tokens"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("429"), "got: {detail}");
    }
}
