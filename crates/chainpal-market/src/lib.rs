//! Solana market data for the widget endpoints.
//!
//! [`MarketService`] queries Bitquery with static GraphQL documents and
//! fills token metadata (description, image, socials) from IPFS.

use async_trait::async_trait;

use chainpal_core::types::Interval;

pub mod bitquery;
pub mod error;
pub mod ipfs;
pub mod queries;
pub mod service;
pub mod types;

pub use error::MarketError;
pub use service::MarketService;
pub use types::{ChartData, HoldersData, PumpFunTrade, TrendingToken, WalletBalance};

/// Market lookups behind the `/api/toolcall/...` endpoints.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// OHLC candles for a token plus its latest trade info.
    async fn chart(&self, mint_address: &str, interval: Interval)
    -> Result<ChartData, MarketError>;

    /// Top pump.fun tokens by buy price.
    async fn pumpfun_top_tokens(&self) -> Result<Vec<PumpFunTrade>, MarketError>;

    /// Non-pump tokens with the most USD volume over the last hour.
    async fn trending_tokens(&self) -> Result<Vec<TrendingToken>, MarketError>;

    /// Top traders of a token by USD volume over the last day.
    async fn top_traders(&self, mint_address: &str)
    -> Result<Vec<serde_json::Value>, MarketError>;

    /// Largest holders of a token with their share of supply.
    async fn top_holders(&self, mint_address: &str) -> Result<HoldersData, MarketError>;

    /// Token balances held by a wallet.
    async fn wallet_balance(&self, wallet_address: &str)
    -> Result<Vec<WalletBalance>, MarketError>;
}
