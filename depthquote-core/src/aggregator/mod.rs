//! Concurrent multi-venue fan-out

use crate::symbols::{Symbol, Venue};
use crate::venues::{FetchStatus, VenueClient, VenueFetchResult};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fans one symbol out to every venue client concurrently and collects a
/// typed outcome per venue.
///
/// The aggregator never fails structurally: a subset of venues failing,
/// or all of them, still yields a complete result map. Each venue fetch
/// is wrapped in a hard timeout so one slow venue cannot delay siblings
/// or the overall join; timing out one venue drops only that venue's
/// in-flight call.
pub struct DepthAggregator {
    clients: Vec<Arc<dyn VenueClient>>,
    venue_budget: Duration,
}

impl DepthAggregator {
    pub fn new(clients: Vec<Arc<dyn VenueClient>>, venue_budget: Duration) -> Self {
        Self {
            clients,
            venue_budget,
        }
    }

    pub fn venues(&self) -> Vec<Venue> {
        self.clients.iter().map(|client| client.venue()).collect()
    }

    /// Wait-for-all with a per-venue timeout: completes once every venue
    /// has either returned or been timed out. There is no retry across
    /// venues and no first-success race.
    pub async fn fetch_all(&self, symbol: &Symbol) -> HashMap<Venue, VenueFetchResult> {
        let tasks = self.clients.iter().map(|client| {
            let client = Arc::clone(client);
            let symbol = symbol.clone();
            let budget = self.venue_budget;
            async move {
                let venue = client.venue();
                let outcome =
                    match tokio::time::timeout(budget, fetch_one(client.as_ref(), &symbol)).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(venue = %venue, symbol = %symbol, "venue fetch timed out");
                            VenueFetchResult::Failure {
                                status: FetchStatus::Timeout,
                                reason: format!("no response within {}ms", budget.as_millis()),
                            }
                        }
                    };
                (venue, outcome)
            }
        });

        join_all(tasks).await.into_iter().collect()
    }
}

/// One venue's fetch: book and 24h volume in parallel, every error
/// converted to a typed outcome before the caller's join. A failed
/// volume fetch degrades to an unknown volume; the book still stands.
async fn fetch_one(client: &dyn VenueClient, symbol: &Symbol) -> VenueFetchResult {
    let (book, volume) = tokio::join!(
        client.fetch_orderbook(symbol),
        client.fetch_volume_24h(symbol)
    );

    match book {
        Ok(book) => {
            let volume_24h = match volume {
                Ok(v) if v.is_finite() && v > 0.0 => Some(v),
                Ok(_) => None,
                Err(err) => {
                    debug!(venue = %client.venue(), symbol = %symbol, error = %err, "24h volume unavailable");
                    None
                }
            };
            VenueFetchResult::Success { book, volume_24h }
        }
        Err(err) => {
            let status = err.fetch_status();
            match status {
                FetchStatus::Unavailable => {
                    debug!(venue = %client.venue(), symbol = %symbol, "pair not listed")
                }
                _ => {
                    warn!(venue = %client.venue(), symbol = %symbol, error = %err, "venue fetch failed")
                }
            }
            VenueFetchResult::Failure {
                status,
                reason: err.to_string(),
            }
        }
    }
}
