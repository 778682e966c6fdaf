//! Binance venue client

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
pub struct BinanceConfig {
    pub base_url: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
        }
    }
}

/// Depth endpoint response; prices and quantities are string-encoded.
#[derive(Deserialize, Debug)]
struct DepthResponse {
    #[serde(rename = "lastUpdateId")]
    #[allow(dead_code)]
    last_update_id: u64,
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

#[derive(Deserialize, Debug)]
struct Ticker24h {
    /// 24h base-asset volume.
    volume: String,
}

pub struct BinanceClient {
    base: Url,
    http: reqwest::Client,
    catalog: Arc<SymbolCatalog>,
    retry: RetryPolicy,
    depth_limit: u32,
}

impl BinanceClient {
    pub fn new(
        config: BinanceConfig,
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
            depth_limit: quote_config.depth_limit,
        })
    }

    fn native_symbol(&self, symbol: &Symbol) -> Result<String, VenueError> {
        self.catalog
            .to_native(symbol, Venue::Binance)
            .ok_or_else(|| VenueError::Unsupported {
                venue: Venue::Binance,
                symbol: symbol.clone(),
            })
    }

    fn endpoint(&self, path: &str) -> Result<Url, VenueError> {
        self.base
            .join(path)
            .map_err(|e| VenueError::Parse(format!("bad endpoint {:?}: {}", path, e)))
    }

    fn parse_side(rows: &[[String; 2]]) -> Result<Vec<BookLevel>, VenueError> {
        rows.iter()
            .map(|[price, quantity]| parse_level(price, quantity))
            .collect()
    }
}

#[async_trait]
impl VenueClient for BinanceClient {
    fn venue(&self) -> Venue {
        Venue::Binance
    }

    fn is_supported(&self, symbol: &Symbol) -> bool {
        self.catalog.to_native(symbol, Venue::Binance).is_some()
    }

    async fn fetch_orderbook(&self, symbol: &Symbol) -> Result<OrderBookSnapshot, VenueError> {
        let native = self.native_symbol(symbol)?;
        let url = self.endpoint("/api/v3/depth")?;
        let params = [
            ("symbol", native),
            ("limit", self.depth_limit.to_string()),
        ];

        let depth: DepthResponse = with_backoff(Venue::Binance, &self.retry, || {
            get_json(&self.http, url.clone(), &params)
        })
        .await?;

        let book = OrderBookSnapshot::from_levels(
            Venue::Binance,
            symbol.clone(),
            Self::parse_side(&depth.bids)?,
            Self::parse_side(&depth.asks)?,
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
        let url = self.endpoint("/api/v3/ticker/24hr")?;
        let params = [("symbol", native)];

        let ticker: Ticker24h = with_backoff(Venue::Binance, &self.retry, || {
            get_json(&self.http, url.clone(), &params)
        })
        .await?;

        ticker
            .volume
            .parse::<f64>()
            .map_err(|e| VenueError::Parse(format!("bad volume {:?}: {}", ticker.volume, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BinanceClient {
        BinanceClient::new(
            BinanceConfig::default(),
            Arc::new(SymbolCatalog::new()),
            &QuoteConfig::default(),
        )
        .expect("client should build")
    }

    #[test]
    fn unsupported_pair_short_circuits_without_network() {
        let client = client();
        assert!(!client.is_supported(&Symbol::new("BTC-ZAR")));
        let err = client.native_symbol(&Symbol::new("BTC-ZAR")).unwrap_err();
        assert!(matches!(err, VenueError::Unsupported { .. }));
    }

    #[test]
    fn depth_response_parses_into_sorted_levels() {
        let raw = r#"{
            "lastUpdateId": 1027024,
            "bids": [["4.00000000", "431.0"], ["3.99000000", "9.0"]],
            "asks": [["4.00000200", "12.0"], ["4.10000000", "28.0"]]
        }"#;
        let depth: DepthResponse = serde_json::from_str(raw).expect("fixture should parse");
        let bids = BinanceClient::parse_side(&depth.bids).expect("bids should parse");
        let asks = BinanceClient::parse_side(&depth.asks).expect("asks should parse");
        let book = OrderBookSnapshot::from_levels(
            Venue::Binance,
            Symbol::new("BTC-USDT"),
            bids,
            asks,
        );
        assert_eq!(book.best_bid(), Some(4.0));
        assert_eq!(book.best_ask(), Some(4.000002));
        assert!(book.validate());
    }

    #[test]
    fn garbage_depth_rows_are_parse_errors() {
        let rows = [["abc".to_string(), "1.0".to_string()]];
        assert!(BinanceClient::parse_side(&rows).is_err());
    }
}
