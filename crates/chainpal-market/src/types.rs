//! Bitquery response shapes, kept close to the wire names the client reads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Bitquery aggregates arrive as strings or numbers depending on the field.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Parse a Bitquery decimal string, treating junk as zero.
pub(crate) fn parse_amount(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

/// Off-chain metadata from the token's IPFS document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, rename = "createdOn")]
    pub created_on: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Currency {
    pub mint_address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fungible: Option<bool>,
    #[serde(flatten)]
    pub metadata: TokenMetadata,
}

// --- chart ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleBlock {
    #[serde(rename = "Timefield")]
    pub timefield: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePrices {
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub close: f64,
    #[serde(default)]
    pub price_last: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(rename = "Block")]
    pub block: CandleBlock,
    #[serde(rename = "Trade")]
    pub trade: CandlePrices,
    #[serde(deserialize_with = "string_or_number")]
    pub count: String,
    #[serde(deserialize_with = "string_or_number")]
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LatestTrade {
    pub currency: Currency,
    #[serde(default, rename = "PriceInUSD")]
    pub price_in_usd: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(rename = "Trade")]
    pub trade: LatestTrade,
}

/// Candles newest first, plus the token's latest trade if it ever traded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub candles: Vec<Candle>,
    pub token: Option<TokenInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartSolana {
    #[serde(default)]
    pub ohlc: Vec<Candle>,
    #[serde(default)]
    pub token_info: Vec<TokenInfo>,
}

// --- pump.fun top tokens ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PumpFunBuy {
    pub price: f64,
    #[serde(rename = "PriceInUSD")]
    pub price_in_usd: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpFunSide {
    #[serde(rename = "Buy")]
    pub buy: PumpFunBuy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpFunTrade {
    #[serde(rename = "Trade")]
    pub trade: PumpFunSide,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PumpFunSolana {
    #[serde(rename = "DEXTrades", default)]
    pub trades: Vec<PumpFunTrade>,
}

// --- trending ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTrade {
    #[serde(rename = "Currency")]
    pub currency: Currency,
    #[serde(flatten)]
    pub prices: Map<String, Value>,
}

/// A trending token: its currency plus the volume aggregates as returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingToken {
    #[serde(rename = "Trade")]
    pub trade: TrendingTrade,
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingSolana {
    #[serde(rename = "DEXTradeByTokens", default)]
    pub tokens: Vec<TrendingToken>,
}

// --- top traders ---

#[derive(Debug, Deserialize)]
pub(crate) struct TradersSolana {
    #[serde(rename = "DEXTradeByTokens", default)]
    pub traders: Vec<Value>,
}

// --- top holders ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "Owner")]
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSupply {
    #[serde(rename = "PostBalance", deserialize_with = "string_or_number")]
    pub post_balance: String,
    #[serde(
        rename = "PostBalanceInUSD",
        default,
        deserialize_with = "string_or_number"
    )]
    pub post_balance_in_usd: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SupplyUpdate {
    #[serde(rename = "TokenSupplyUpdate")]
    pub update: TokenSupply,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHolderBalance {
    #[serde(rename = "Account")]
    pub account: Account,
    #[serde(deserialize_with = "string_or_number")]
    pub balance: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHolder {
    #[serde(rename = "BalanceUpdate")]
    pub balance_update: RawHolderBalance,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HoldersSolana {
    #[serde(rename = "TokenSupplyUpdates", default)]
    pub supply: Vec<SupplyUpdate>,
    #[serde(rename = "Top_holders", default)]
    pub holders: Vec<RawHolder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holder {
    #[serde(rename = "Account")]
    pub account: Account,
    pub balance: String,
    pub percentage_owned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldersData {
    #[serde(rename = "TokenSupplyUpdate")]
    pub supply: Option<TokenSupply>,
    #[serde(rename = "Top_holders")]
    pub holders: Vec<Holder>,
}

// --- wallet balance ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(rename = "Balance", deserialize_with = "string_or_number")]
    pub balance: String,
    #[serde(rename = "Currency")]
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBalance {
    #[serde(rename = "BalanceUpdate")]
    pub balance_update: WalletBalance,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceSolana {
    #[serde(rename = "BalanceUpdates", default)]
    pub balances: Vec<RawBalance>,
}

/// `{"Solana": ...}` wrapper around every query result.
#[derive(Debug, Deserialize)]
pub(crate) struct Solana<T> {
    #[serde(rename = "Solana")]
    pub solana: T,
}
