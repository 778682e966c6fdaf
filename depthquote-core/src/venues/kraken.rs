//! Kraken venue client
//!
//! Kraken's public API enforces a strict call budget, so every outbound
//! request goes through a FIFO pacer that keeps at least one second
//! between dispatches. The pacer is owned by this client; other venues
//! are not affected.

use super::client::{build_http_client, get_json, parse_level, with_backoff, RetryPolicy, VenueClient};
use super::errors::VenueError;
use super::pacing::RequestPacer;
use super::types::{BookLevel, OrderBookSnapshot};
use crate::symbols::{Symbol, SymbolCatalog, Venue};
use crate::QuoteConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct KrakenConfig {
    pub base_url: String,
    /// Venue-side limit: at most one request per second.
    pub min_request_interval: Duration,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kraken.com".to_string(),
            min_request_interval: Duration::from_secs(1),
        }
    }
}

/// Every Kraken response wraps its payload in an error/result envelope.
#[derive(Deserialize, Debug)]
struct KrakenEnvelope<T> {
    error: Vec<String>,
    result: Option<T>,
}

/// Depth rows are `[price, volume, timestamp]`.
#[derive(Deserialize, Debug)]
struct KrakenDepth {
    bids: Vec<(String, String, serde_json::Value)>,
    asks: Vec<(String, String, serde_json::Value)>,
}

#[derive(Deserialize, Debug)]
struct KrakenTicker {
    /// Volume array: `[today, last 24 hours]`.
    v: [String; 2],
}

pub struct KrakenClient {
    base: Url,
    http: reqwest::Client,
    catalog: Arc<SymbolCatalog>,
    retry: RetryPolicy,
    depth_limit: u32,
    pacer: RequestPacer,
}

impl KrakenClient {
    pub fn new(
        config: KrakenConfig,
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
            pacer: RequestPacer::new(config.min_request_interval),
        })
    }

    fn native_symbol(&self, symbol: &Symbol) -> Result<String, VenueError> {
        self.catalog
            .to_native(symbol, Venue::Kraken)
            .ok_or_else(|| VenueError::Unsupported {
                venue: Venue::Kraken,
                symbol: symbol.clone(),
            })
    }

    fn endpoint(&self, path: &str) -> Result<Url, VenueError> {
        self.base
            .join(path)
            .map_err(|e| VenueError::Parse(format!("bad endpoint {:?}: {}", path, e)))
    }

    /// Paced GET that unwraps Kraken's error/result envelope. The result
    /// map is keyed by a native pair spelling that may differ from the
    /// requested one, so the single entry is taken as-is.
    async fn get_result<T>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, VenueError>
    where
        T: DeserializeOwned,
    {
        self.pacer.acquire().await;
        let envelope: KrakenEnvelope<T> = get_json(&self.http, url, params).await?;
        if !envelope.error.is_empty() {
            let message = envelope.error.join("; ");
            if message.contains("Rate limit") {
                return Err(VenueError::RateLimited { retry_after: None });
            }
            return Err(VenueError::Api(message));
        }
        envelope
            .result
            .ok_or_else(|| VenueError::Parse("missing result payload".to_string()))
    }

    fn parse_side(rows: &[(String, String, serde_json::Value)]) -> Result<Vec<BookLevel>, VenueError> {
        rows.iter()
            .map(|(price, volume, _)| parse_level(price, volume))
            .collect()
    }

    fn take_single_entry<T>(result: HashMap<String, T>) -> Result<T, VenueError> {
        result
            .into_iter()
            .next()
            .map(|(_, value)| value)
            .ok_or_else(|| VenueError::Parse("empty result map".to_string()))
    }
}

#[async_trait]
impl VenueClient for KrakenClient {
    fn venue(&self) -> Venue {
        Venue::Kraken
    }

    fn is_supported(&self, symbol: &Symbol) -> bool {
        self.catalog.to_native(symbol, Venue::Kraken).is_some()
    }

    async fn fetch_orderbook(&self, symbol: &Symbol) -> Result<OrderBookSnapshot, VenueError> {
        let native = self.native_symbol(symbol)?;
        let url = self.endpoint("/0/public/Depth")?;
        let params = [
            ("pair", native),
            ("count", self.depth_limit.to_string()),
        ];

        let result: HashMap<String, KrakenDepth> =
            with_backoff(Venue::Kraken, &self.retry, || {
                self.get_result(url.clone(), &params)
            })
            .await?;
        let depth = Self::take_single_entry(result)?;

        let book = OrderBookSnapshot::from_levels(
            Venue::Kraken,
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
        let url = self.endpoint("/0/public/Ticker")?;
        let params = [("pair", native)];

        let result: HashMap<String, KrakenTicker> =
            with_backoff(Venue::Kraken, &self.retry, || {
                self.get_result(url.clone(), &params)
            })
            .await?;
        let ticker = Self::take_single_entry(result)?;

        ticker.v[1]
            .parse::<f64>()
            .map_err(|e| VenueError::Parse(format!("bad volume {:?}: {}", ticker.v[1], e)))
    }
}
