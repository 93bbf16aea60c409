//! Token metadata from IPFS documents.
//!
//! Fetch failures are not errors: the currency keeps empty metadata fields.

use futures::{StreamExt, stream};
use tracing::debug;

use crate::types::{Currency, TokenMetadata};

pub struct IpfsMetadataFetcher {
    http: reqwest::Client,
    gateway: String,
    concurrency: usize,
}

impl IpfsMetadataFetcher {
    pub fn new(http: reqwest::Client, gateway: impl Into<String>, concurrency: usize) -> Self {
        let mut gateway = gateway.into();
        if !gateway.ends_with('/') {
            gateway.push('/');
        }
        Self {
            http,
            gateway,
            concurrency: concurrency.max(1),
        }
    }

    /// Map a token URI to a fetchable URL: `ipfs://CID` goes through the gateway.
    pub fn resolve_uri(&self, uri: &str) -> Option<String> {
        let uri = uri.trim();
        if let Some(cid) = uri.strip_prefix("ipfs://") {
            return Some(format!("{}{}", self.gateway, cid.trim_start_matches("ipfs/")));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Some(uri.to_string());
        }
        None
    }

    pub async fn fetch(&self, uri: &str) -> Option<TokenMetadata> {
        let url = self.resolve_uri(uri)?;
        let response = match self.http.get(&url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(%url, status = r.status().as_u16(), "Metadata fetch failed");
                return None;
            }
            Err(e) => {
                debug!(%url, %e, "Metadata fetch failed");
                return None;
            }
        };
        match response.json::<TokenMetadata>().await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                debug!(%url, %e, "Metadata is not valid JSON");
                None
            }
        }
    }

    /// Fill metadata on every currency with a resolvable URI.
    pub async fn enrich<'a, I>(&self, currencies: I)
    where
        I: IntoIterator<Item = &'a mut Currency>,
    {
        let mut currencies: Vec<&mut Currency> = currencies.into_iter().collect();
        let jobs: Vec<(usize, String)> = currencies
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.uri.clone().filter(|u| !u.is_empty()).map(|u| (i, u)))
            .collect();

        let fetched: Vec<(usize, Option<TokenMetadata>)> = stream::iter(jobs)
            .map(|(i, uri)| async move { (i, self.fetch(&uri).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (i, metadata) in fetched {
            if let Some(metadata) = metadata {
                currencies[i].metadata = metadata;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(mint: &str, uri: Option<&str>) -> Currency {
        Currency {
            mint_address: mint.into(),
            name: String::new(),
            symbol: String::new(),
            uri: uri.map(Into::into),
            decimals: None,
            fungible: None,
            metadata: TokenMetadata::default(),
        }
    }

    #[test]
    fn test_resolve_uri() {
        let fetcher = IpfsMetadataFetcher::new(reqwest::Client::new(), "https://ipfs.io/ipfs", 4);
        assert_eq!(
            fetcher.resolve_uri("ipfs://QmAbc").as_deref(),
            Some("https://ipfs.io/ipfs/QmAbc")
        );
        assert_eq!(
            fetcher.resolve_uri("https://cf-ipfs.com/ipfs/QmAbc").as_deref(),
            Some("https://cf-ipfs.com/ipfs/QmAbc")
        );
        assert!(fetcher.resolve_uri("ar://xyz").is_none());
        assert!(fetcher.resolve_uri("").is_none());
    }

    #[tokio::test]
    async fn test_enrich_fills_found_metadata_and_skips_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ipfs/QmGood")
            .with_status(200)
            .with_body(r#"{"description": "a dog", "image": "https://img/dog.png", "twitter": "@dog", "createdOn": "https://pump.fun"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/ipfs/QmGone")
            .with_status(504)
            .create_async()
            .await;

        let fetcher = IpfsMetadataFetcher::new(
            reqwest::Client::new(),
            format!("{}/ipfs/", server.url()),
            2,
        );
        let mut tokens = vec![
            currency("a", Some("ipfs://QmGood")),
            currency("b", Some("ipfs://QmGone")),
            currency("c", None),
        ];
        fetcher.enrich(tokens.iter_mut()).await;

        assert_eq!(tokens[0].metadata.description, "a dog");
        assert_eq!(tokens[0].metadata.created_on, "https://pump.fun");
        assert_eq!(tokens[0].metadata.website, "");
        assert_eq!(tokens[1].metadata, TokenMetadata::default());
        assert_eq!(tokens[2].metadata, TokenMetadata::default());
    }
}
