//! Multi-Venue Depth Quoting Library
//!
//! Quotes the real execution cost of a trade by fetching live orderbook
//! depth from several venues concurrently and computing the
//! volume-weighted fill price the order would actually receive, rather
//! than the top-of-book quote.

pub mod aggregator;
pub mod api;
pub mod impact;
pub mod quote;
pub mod symbols;
pub mod venues;

// Re-export main types for easy access
pub use aggregator::DepthAggregator;
pub use api::QuoteApiServer;
pub use impact::{compute_impact, PriceImpact};
pub use quote::{AggregatedQuote, QuoteOutcome, QuoteRequest, VenueQuote};
pub use symbols::{Symbol, SymbolCatalog, Venue};
pub use venues::{
    BinanceClient, BinanceConfig, BookLevel, CoinbaseClient, CoinbaseConfig, FetchStatus,
    KrakenClient, KrakenConfig, OrderBookSnapshot, RetryPolicy, Side, VenueClient, VenueError,
    VenueFetchResult,
};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Engine configuration
#[derive(Clone, Debug)]
pub struct QuoteConfig {
    /// Timeout for a single outbound HTTP call.
    pub call_timeout: Duration,
    /// Hard cap the aggregator puts on each venue's whole fetch.
    pub venue_budget: Duration,
    /// Local retry discipline for rate-limited calls.
    pub retry: RetryPolicy,
    /// Depth levels requested from each venue.
    pub depth_limit: u32,
    /// Snapshots older than this at use time are flagged stale.
    pub stale_after: Duration,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            venue_budget: Duration::from_secs(8),
            retry: RetryPolicy::default(),
            depth_limit: 100,
            stale_after: Duration::from_secs(5),
        }
    }
}

/// Running counters for the service lifetime.
#[derive(Default, Clone, Debug)]
pub struct QuoteStats {
    pub quotes_served: u64,
    pub venue_failures: u64,
}

/// Main interface: owns the venue clients and turns a request into an
/// aggregated quote.
pub struct QuoteService {
    aggregator: DepthAggregator,
    config: QuoteConfig,
    stats: parking_lot::RwLock<QuoteStats>,
}

impl QuoteService {
    /// Build a service backed by the three public venue clients sharing
    /// one symbol catalog. Construction failures here are the only hard
    /// failures in the pipeline.
    pub fn with_default_venues(config: QuoteConfig) -> Result<Self> {
        let catalog = Arc::new(SymbolCatalog::new());
        let clients: Vec<Arc<dyn VenueClient>> = vec![
            Arc::new(BinanceClient::new(
                BinanceConfig::default(),
                catalog.clone(),
                &config,
            )?),
            Arc::new(CoinbaseClient::new(
                CoinbaseConfig::default(),
                catalog.clone(),
                &config,
            )?),
            Arc::new(KrakenClient::new(
                KrakenConfig::default(),
                catalog.clone(),
                &config,
            )?),
        ];
        Ok(Self::new(clients, config))
    }

    pub fn new(clients: Vec<Arc<dyn VenueClient>>, config: QuoteConfig) -> Self {
        Self {
            aggregator: DepthAggregator::new(clients, config.venue_budget),
            config,
            stats: parking_lot::RwLock::new(QuoteStats::default()),
        }
    }

    /// Fetch fresh depth from every venue and assemble the quote. Venue
    /// failures are folded into the response; this never errors for
    /// venue-level problems.
    pub async fn quote(&self, request: &QuoteRequest) -> AggregatedQuote {
        let results = self.aggregator.fetch_all(&request.symbol).await;
        let failures = results.values().filter(|r| !r.is_success()).count() as u64;

        let quote = quote::assemble(request, results, self.config.stale_after);

        let mut stats = self.stats.write();
        stats.quotes_served += 1;
        stats.venue_failures += failures;

        quote
    }

    pub fn stats(&self) -> QuoteStats {
        self.stats.read().clone()
    }
}
