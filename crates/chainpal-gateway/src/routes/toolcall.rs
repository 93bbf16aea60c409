//! Market data behind the tool widgets. Every response is `{"data": ...}`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use chainpal_core::types::Interval;

use crate::boundary::logged;
use crate::error::ApiError;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub mint_address: String,
    pub interval: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MintQuery {
    pub mint_address: String,
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet_address: String,
}

fn data<T: Serialize>(value: T) -> Result<Json<Value>, ApiError> {
    let value = serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(json!({ "data": value })))
}

fn parse_interval(raw: Option<&str>) -> Result<Interval, ApiError> {
    match raw {
        None => Ok(Interval::default()),
        Some(code) => code
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid interval parameter")),
    }
}

pub async fn market_chart(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Value>, ApiError> {
    let args = (query.mint_address.clone(), query.interval.clone());
    logged("market_chart", args, async move {
        let interval = parse_interval(query.interval.as_deref())?;
        data(state.market.chart(&query.mint_address, interval).await?)
    })
    .await
}

pub async fn pumpfun_top_tokens(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<Value>, ApiError> {
    logged("pumpfun_top_tokens", (), async move {
        data(state.market.pumpfun_top_tokens().await?)
    })
    .await
}

pub async fn trending_tokens(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<Value>, ApiError> {
    logged("trending_tokens", (), async move {
        data(state.market.trending_tokens().await?)
    })
    .await
}

pub async fn top_holders(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<MintQuery>,
) -> Result<Json<Value>, ApiError> {
    logged("top_holders", query.mint_address.clone(), async move {
        data(state.market.top_holders(&query.mint_address).await?)
    })
    .await
}

pub async fn top_traders(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<MintQuery>,
) -> Result<Json<Value>, ApiError> {
    logged("top_traders", query.mint_address.clone(), async move {
        data(state.market.top_traders(&query.mint_address).await?)
    })
    .await
}

pub async fn wallet_balance(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<Value>, ApiError> {
    logged("wallet_balance", query.wallet_address.clone(), async move {
        data(state.market.wallet_balance(&query.wallet_address).await?)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval(None).unwrap(), Interval::default());
        assert_eq!(parse_interval(Some("1d")).unwrap().as_str(), "1d");
        assert_eq!(
            parse_interval(Some("2h")).unwrap_err(),
            ApiError::bad_request("Invalid interval parameter")
        );
    }
}
