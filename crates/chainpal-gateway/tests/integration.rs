//! Gateway integration tests: start a real gateway and talk to it over HTTP.
//!
//! Run with: `cargo test -p chainpal-gateway --test integration`

use std::sync::Arc;

use futures::StreamExt;
use mockito::Matcher;
use serde_json::json;

use chainpal_agent::{Agent, AgentEvent, EventStream, ReplyPipeline};
use chainpal_core::config::Config;
use chainpal_core::store::JsonChatStore;
use chainpal_core::types::{ChatTurn, ToolKind, ToolResult};
use chainpal_gateway::GatewayState;
use chainpal_market::MarketService;

/// Find an available port.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Answers every question with a short text and two token lists.
struct TopTokensAgent;

impl Agent for TopTokensAgent {
    fn stream_events(&self, input: String, _history: Vec<ChatTurn>) -> EventStream {
        let listing = ToolResult::new(ToolKind::TopTokens).with_endpoint("pumpfun-top-tokens");
        let events = vec![
            AgentEvent::ToolStart {
                name: "TopTokens".into(),
                input: json!({}),
            },
            AgentEvent::ToolEnd {
                name: "TopTokens".into(),
                output: listing.clone(),
            },
            AgentEvent::TextDelta {
                content: format!("You asked: {input}. "),
            },
            AgentEvent::ToolEnd {
                name: "TopTokens".into(),
                output: listing,
            },
            AgentEvent::TextDelta {
                content: "Done.".into(),
            },
        ];
        Box::pin(futures::stream::iter(events.into_iter().map(Ok::<_, anyhow::Error>)))
    }
}

/// Start a gateway backed by `bitquery` and return its port.
async fn start_test_gateway(bitquery: &mockito::ServerGuard) -> (u16, tempfile::TempDir) {
    let port = find_free_port();
    let store_dir = tempfile::TempDir::new().unwrap();

    let config: Config = serde_json::from_value(json!({
        "market": {
            "bitquery_url": format!("{}/graphql", bitquery.url()),
            "api_key": "test-key",
            "ipfs_gateway": format!("{}/ipfs", bitquery.url()),
            "timeout_secs": 5
        },
        "gateway": {"port": port, "bind": "127.0.0.1"}
    }))
    .unwrap();

    let market = MarketService::from_config(&config).unwrap();
    let replies = ReplyPipeline::from_config(Arc::new(TopTokensAgent), &config);
    let state = Arc::new(GatewayState::new(
        Arc::new(config),
        replies,
        Arc::new(JsonChatStore::new(store_dir.path().to_path_buf())),
        Arc::new(market),
    ));

    tokio::spawn(async move {
        let _ = chainpal_gateway::start_gateway(state, port).await;
    });

    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .is_ok()
        {
            break;
        }
    }

    (port, store_dir)
}

#[tokio::test]
async fn test_health_endpoint() {
    let bitquery = mockito::Server::new_async().await;
    let (port, _store) = start_test_gateway(&bitquery).await;

    let resp = reqwest::get(format!("http://127.0.0.1:{port}/health"))
        .await
        .expect("Health request failed");

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_reply_streams_over_http() {
    let bitquery = mockito::Server::new_async().await;
    let (port, _store) = start_test_gateway(&bitquery).await;

    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/api/chat/generate"))
        .json(&json!({"messages": [
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"},
            {"role": "user", "content": "top tokens?"}
        ]}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let mut body = String::new();
    let mut chunks = resp.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        body.push_str(std::str::from_utf8(&chunk.unwrap()).unwrap());
    }

    let lines: Vec<&str> = body.split('\n').collect();
    assert_eq!(lines.len(), 2, "got: {body}");
    let envelope: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(envelope["tool"], "TopTokens");
    assert_eq!(envelope["type"], "top_tokens");
    assert_eq!(envelope["endpoint"], "pumpfun-top-tokens");
    assert_eq!(lines[1], "You asked: top tokens?. Done.");
}

#[tokio::test]
async fn test_wallet_balance_through_bitquery() {
    let mut bitquery = mockito::Server::new_async().await;
    let graphql = bitquery
        .mock("POST", "/graphql")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({"variables": {"owner": "wallet1"}})))
        .with_status(200)
        .with_body(
            json!({"data": {"Solana": {"BalanceUpdates": [
                {"BalanceUpdate": {"Balance": "3", "Currency": {
                    "Name": "Cat", "Symbol": "CAT", "MintAddress": "cat", "Uri": "ipfs://QmCat"
                }}}
            ]}}})
            .to_string(),
        )
        .create_async()
        .await;
    bitquery
        .mock("GET", "/ipfs/QmCat")
        .with_status(200)
        .with_body(r#"{"description": "meow"}"#)
        .create_async()
        .await;
    let (port, _store) = start_test_gateway(&bitquery).await;

    let resp = reqwest::get(format!(
        "http://127.0.0.1:{port}/api/toolcall/wallet-balance?wallet_address=wallet1"
    ))
    .await
    .unwrap();
    assert!(resp.status().is_success());

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["Currency"]["Symbol"], "CAT");
    assert_eq!(body["data"][0]["Currency"]["description"], "meow");
    graphql.assert_async().await;
}

#[tokio::test]
async fn test_bitquery_failure_maps_to_bad_gateway() {
    let mut bitquery = mockito::Server::new_async().await;
    bitquery
        .mock("POST", "/graphql")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;
    let (port, _store) = start_test_gateway(&bitquery).await;

    let resp = reqwest::get(format!(
        "http://127.0.0.1:{port}/api/toolcall/top-traders?mint_address=abc"
    ))
    .await
    .unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("503"));
}
