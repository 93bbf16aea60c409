//! Minimal Bitquery GraphQL client.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::MarketError;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

pub struct BitqueryClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl BitqueryClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key,
        }
    }

    /// POST `document` with `variables` and decode the `data` member.
    pub async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T, MarketError> {
        debug!(url = %self.url, %variables, "Bitquery request");

        let mut request = self.http.post(&self.url).json(&json!({
            "query": document,
            "variables": variables,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Bitquery request failed");
            return Err(MarketError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| MarketError::InvalidResponse(e.to_string()))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(MarketError::GraphQl(messages.join("; ")));
        }
        parsed
            .data
            .ok_or_else(|| MarketError::InvalidResponse("response has no data".into()))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Echo {
        value: u32,
    }

    fn client(server: &mockito::Server) -> BitqueryClient {
        BitqueryClient::new(reqwest::Client::new(), server.url(), Some("bq-test".into()))
    }

    #[tokio::test]
    async fn test_query_sends_variables_and_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "Bearer bq-test")
            .match_body(Matcher::PartialJson(json!({"variables": {"mint": "abc"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"value": 7}}"#)
            .create_async()
            .await;

        let echo: Echo = client(&server)
            .query("query Q($mint: String!) { x }", json!({"mint": "abc"}))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(echo.value, 7);
    }

    #[tokio::test]
    async fn test_graphql_errors_surface() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"data": null, "errors": [{"message": "Unknown field"}]}"#)
            .create_async()
            .await;

        let err = client(&server)
            .query::<Echo>("query { x }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::GraphQl(ref m) if m == "Unknown field"), "got: {err}");
    }

    #[tokio::test]
    async fn test_http_status_and_missing_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(402)
            .with_body("out of points")
            .create_async()
            .await;
        let err = client(&server)
            .query::<Echo>("query { x }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Status { status: 402, .. }), "got: {err}");

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{}"#)
            .create_async()
            .await;
        let err = client(&server)
            .query::<Echo>("query { x }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidResponse(_)), "got: {err}");
    }
}
