use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::info;

use chainpal_core::config::Config;
use chainpal_core::types::Interval;

use crate::bitquery::BitqueryClient;
use crate::ipfs::IpfsMetadataFetcher;
use crate::queries;
use crate::types::{
    BalanceSolana, ChartData, ChartSolana, Holder, HoldersData, HoldersSolana, PumpFunSolana,
    PumpFunTrade, Solana, TradersSolana, TrendingSolana, TrendingToken, WalletBalance,
    parse_amount,
};
use crate::{MarketData, MarketError};

const TRENDING_WINDOW_HOURS: i64 = 1;
const TRADERS_WINDOW_HOURS: i64 = 24;
const HOLDERS_WINDOW_HOURS: i64 = 24 * 30;

/// RFC 3339 timestamp `hours` before now.
fn since(hours: i64) -> String {
    (Utc::now() - chrono::Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Share of `supply` held by `balance`, in percent. Zero when supply is zero.
pub fn percentage_owned(balance: f64, supply: f64) -> f64 {
    if supply > 0.0 {
        balance / supply * 100.0
    } else {
        0.0
    }
}

pub struct MarketService {
    bitquery: BitqueryClient,
    ipfs: IpfsMetadataFetcher,
}

impl MarketService {
    pub fn new(bitquery: BitqueryClient, ipfs: IpfsMetadataFetcher) -> Self {
        Self { bitquery, ipfs }
    }

    pub fn from_config(config: &Config) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.market_timeout_secs()))
            .build()?;
        let bitquery =
            BitqueryClient::new(http.clone(), config.bitquery_url(), config.bitquery_api_key());
        let ipfs =
            IpfsMetadataFetcher::new(http, config.ipfs_gateway(), config.metadata_concurrency());
        Ok(Self::new(bitquery, ipfs))
    }
}

#[async_trait]
impl MarketData for MarketService {
    async fn chart(
        &self,
        mint_address: &str,
        interval: Interval,
    ) -> Result<ChartData, MarketError> {
        let result: Solana<ChartSolana> = self
            .bitquery
            .query(
                queries::CHART,
                json!({
                    "mint": mint_address,
                    "sol": queries::WRAPPED_SOL,
                    "unit": interval.time_unit(),
                    "count": interval.time_count(),
                }),
            )
            .await?;
        let ChartSolana { ohlc, token_info } = result.solana;
        info!(mint = mint_address, %interval, candles = ohlc.len(), "Chart fetched");
        Ok(ChartData {
            candles: ohlc,
            token: token_info.into_iter().next(),
        })
    }

    async fn pumpfun_top_tokens(&self) -> Result<Vec<PumpFunTrade>, MarketError> {
        let result: Solana<PumpFunSolana> = self
            .bitquery
            .query(queries::PUMPFUN_TOP_TOKENS, json!({}))
            .await?;
        let mut trades = result.solana.trades;
        self.ipfs
            .enrich(trades.iter_mut().map(|t| &mut t.trade.buy.currency))
            .await;
        Ok(trades)
    }

    async fn trending_tokens(&self) -> Result<Vec<TrendingToken>, MarketError> {
        let result: Solana<TrendingSolana> = self
            .bitquery
            .query(
                queries::TRENDING_TOKENS,
                json!({
                    "since": since(TRENDING_WINDOW_HOURS),
                    "sol": queries::WRAPPED_SOL,
                    "usdc": queries::USDC,
                    "usdt": queries::USDT,
                }),
            )
            .await?;
        let mut tokens = result.solana.tokens;
        self.ipfs
            .enrich(tokens.iter_mut().map(|t| &mut t.trade.currency))
            .await;
        Ok(tokens)
    }

    async fn top_traders(
        &self,
        mint_address: &str,
    ) -> Result<Vec<serde_json::Value>, MarketError> {
        let result: Solana<TradersSolana> = self
            .bitquery
            .query(
                queries::TOP_TRADERS,
                json!({"mint": mint_address, "since": since(TRADERS_WINDOW_HOURS)}),
            )
            .await?;
        Ok(result.solana.traders)
    }

    async fn top_holders(&self, mint_address: &str) -> Result<HoldersData, MarketError> {
        let result: Solana<HoldersSolana> = self
            .bitquery
            .query(
                queries::TOP_HOLDERS,
                json!({"mint": mint_address, "since": since(HOLDERS_WINDOW_HOURS)}),
            )
            .await?;
        let HoldersSolana { supply, holders } = result.solana;
        let supply = supply.into_iter().next().map(|s| s.update);
        let total = supply
            .as_ref()
            .map(|s| parse_amount(&s.post_balance))
            .unwrap_or(0.0);

        let holders = holders
            .into_iter()
            .map(|h| {
                let balance = h.balance_update.balance;
                Holder {
                    account: h.balance_update.account,
                    percentage_owned: percentage_owned(parse_amount(&balance), total),
                    balance,
                }
            })
            .collect();
        Ok(HoldersData { supply, holders })
    }

    async fn wallet_balance(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<WalletBalance>, MarketError> {
        let result: Solana<BalanceSolana> = self
            .bitquery
            .query(queries::WALLET_BALANCE, json!({"owner": wallet_address}))
            .await?;
        let mut balances: Vec<WalletBalance> = result
            .solana
            .balances
            .into_iter()
            .map(|b| b.balance_update)
            .collect();
        self.ipfs
            .enrich(balances.iter_mut().map(|b| &mut b.currency))
            .await;
        Ok(balances)
    }
}
