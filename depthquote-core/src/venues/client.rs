//! Venue client interface and shared fetch plumbing

use super::errors::VenueError;
use super::types::{BookLevel, OrderBookSnapshot};
use crate::symbols::{Symbol, Venue};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Local retry discipline for a single venue fetch. Retries never cross
/// venues and never outlive the aggregator's per-venue budget.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

/// One implementation per venue, all behind the same read-only interface.
///
/// Every operation denormalizes the canonical symbol first; a missing
/// mapping is a typed `Unsupported` outcome, not a network call.
#[async_trait]
pub trait VenueClient: Send + Sync {
    fn venue(&self) -> Venue;

    /// Whether the venue has a native spelling for this pair.
    fn is_supported(&self, symbol: &Symbol) -> bool;

    /// Fetch a fresh depth snapshot for the pair.
    async fn fetch_orderbook(&self, symbol: &Symbol) -> Result<OrderBookSnapshot, VenueError>;

    /// Fetch the 24h base-asset volume for the pair.
    async fn fetch_volume_24h(&self, symbol: &Symbol) -> Result<f64, VenueError>;
}

/// Run `op`, retrying rate-limited failures with exponential backoff up
/// to the policy's attempt count. A `Retry-After` hint from the venue
/// takes precedence over the computed delay.
pub(crate) async fn with_backoff<T, F, Fut>(
    venue: Venue,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, VenueError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, VenueError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < policy.max_attempts => {
                let mut delay = policy.base_delay * 2u32.saturating_pow(attempt);
                if let VenueError::RateLimited {
                    retry_after: Some(seconds),
                } = err
                {
                    delay = delay.max(Duration::from_secs(seconds));
                }
                debug!(
                    venue = %venue,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// GET a JSON body, classifying HTTP failures before parsing.
pub(crate) async fn get_json<T>(
    http: &reqwest::Client,
    url: Url,
    params: &[(&str, String)],
) -> Result<T, VenueError>
where
    T: DeserializeOwned,
{
    let response = http.get(url).query(params).send().await?;
    let status = response.status();

    if status.as_u16() == 429 || status.as_u16() == 418 {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        return Err(VenueError::RateLimited { retry_after });
    }
    if !status.is_success() {
        return Err(VenueError::Http {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        });
    }

    response.json::<T>().await.map_err(VenueError::from)
}

/// Parse a venue's string-encoded price/quantity pair.
pub(crate) fn parse_level(price: &str, quantity: &str) -> Result<BookLevel, VenueError> {
    let price = price
        .parse::<f64>()
        .map_err(|e| VenueError::Parse(format!("bad price {:?}: {}", price, e)))?;
    let quantity = quantity
        .parse::<f64>()
        .map_err(|e| VenueError::Parse(format!("bad quantity {:?}: {}", quantity, e)))?;
    Ok(BookLevel::new(price, quantity))
}

/// Build the shared HTTP client with the per-call timeout baked in.
/// Failing to construct a client is a hard, pre-dispatch failure.
pub(crate) fn build_http_client(call_timeout: Duration) -> Result<reqwest::Client, VenueError> {
    reqwest::Client::builder()
        .timeout(call_timeout)
        .build()
        .map_err(|e| VenueError::Network(format!("failed to build HTTP client: {}", e)))
}
