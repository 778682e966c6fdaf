//! Coinbase Exchange venue client

use super::client::{build_http_client, get_json, parse_level, with_backoff, RetryPolicy, VenueClient};
use super::errors::VenueError;
use super::types::{BookLevel, OrderBookSnapshot};
use crate::symbols::{Symbol, SymbolCatalog, Venue};
use crate::QuoteConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct CoinbaseConfig {
    pub base_url: String,
}

impl Default for CoinbaseConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchange.coinbase.com".to_string(),
        }
    }
}

/// Level-2 book rows are `[price, size, num_orders]`; the order count is
/// not part of the depth model and is ignored.
#[derive(Deserialize, Debug)]
struct BookResponse {
    bids: Vec<(String, String, serde_json::Value)>,
    asks: Vec<(String, String, serde_json::Value)>,
}

#[derive(Deserialize, Debug)]
struct StatsResponse {
    /// 24h base-asset volume.
    volume: String,
}

pub struct CoinbaseClient {
    base: Url,
    http: reqwest::Client,
    catalog: Arc<SymbolCatalog>,
    retry: RetryPolicy,
}

impl CoinbaseClient {
    pub fn new(
        config: CoinbaseConfig,
        catalog: Arc<SymbolCatalog>,
        quote_config: &QuoteConfig,
    ) -> Result<Self, VenueError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| VenueError::Parse(format!("bad base url {:?}: {}", config.base_url, e)))?;
        Ok(Self {
            base,
            http: build_http_client(quote_config.call_timeout)?,
            catalog,
            retry: quote_config.retry.clone(),
        })
    }

    fn native_symbol(&self, symbol: &Symbol) -> Result<String, VenueError> {
        self.catalog
            .to_native(symbol, Venue::Coinbase)
            .ok_or_else(|| VenueError::Unsupported {
                venue: Venue::Coinbase,
                symbol: symbol.clone(),
            })
    }

    fn endpoint(&self, path: &str) -> Result<Url, VenueError> {
        self.base
            .join(path)
            .map_err(|e| VenueError::Parse(format!("bad endpoint {:?}: {}", path, e)))
    }

    fn parse_side(rows: &[(String, String, serde_json::Value)]) -> Result<Vec<BookLevel>, VenueError> {
        rows.iter()
            .map(|(price, size, _)| parse_level(price, size))
            .collect()
    }
}

#[async_trait]
impl VenueClient for CoinbaseClient {
    fn venue(&self) -> Venue {
        Venue::Coinbase
    }

    fn is_supported(&self, symbol: &Symbol) -> bool {
        self.catalog.to_native(symbol, Venue::Coinbase).is_some()
    }

    async fn fetch_orderbook(&self, symbol: &Symbol) -> Result<OrderBookSnapshot, VenueError> {
        let native = self.native_symbol(symbol)?;
        let url = self.endpoint(&format!("/products/{}/book", native))?;
        let params = [("level", "2".to_string())];

        let response: BookResponse = with_backoff(Venue::Coinbase, &self.retry, || {
            get_json(&self.http, url.clone(), &params)
        })
        .await?;

        let book = OrderBookSnapshot::from_levels(
            Venue::Coinbase,
            symbol.clone(),
            Self::parse_side(&response.bids)?,
            Self::parse_side(&response.asks)?,
        );
        if !book.validate() {
            return Err(VenueError::Parse(
                "orderbook violates price ordering".to_string(),
            ));
        }
        Ok(book)
    }

    async fn fetch_volume_24h(&self, symbol: &Symbol) -> Result<f64, VenueError> {
        let native = self.native_symbol(symbol)?;
        let url = self.endpoint(&format!("/products/{}/stats", native))?;

        let stats: StatsResponse = with_backoff(Venue::Coinbase, &self.retry, || {
            get_json(&self.http, url.clone(), &[])
        })
        .await?;

        stats
            .volume
            .parse::<f64>()
            .map_err(|e| VenueError::Parse(format!("bad volume {:?}: {}", stats.volume, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_rows_ignore_the_order_count_column() {
        let raw = r#"{
            "bids": [["295.96", "4.39", 2], ["295.91", "1.0", 1]],
            "asks": [["296.12", "0.31", 1], ["296.50", "2.2", 3]]
        }"#;
        let response: BookResponse = serde_json::from_str(raw).expect("fixture should parse");
        let bids = CoinbaseClient::parse_side(&response.bids).expect("bids should parse");
        assert_eq!(bids[0], BookLevel::new(295.96, 4.39));
        let asks = CoinbaseClient::parse_side(&response.asks).expect("asks should parse");
        assert_eq!(asks.len(), 2);
    }

    #[test]
    fn native_spelling_is_the_canonical_form() {
        let client = CoinbaseClient::new(
            CoinbaseConfig::default(),
            Arc::new(SymbolCatalog::new()),
            &QuoteConfig::default(),
        )
        .expect("client should build");
        assert_eq!(
            client.native_symbol(&Symbol::new("BTC-USD")).ok(),
            Some("BTC-USD".to_string())
        );
    }
}
