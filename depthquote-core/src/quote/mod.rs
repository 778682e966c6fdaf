//! Quote assembly and the response contract

use crate::impact::{compute_impact, PriceImpact};
use crate::symbols::{Symbol, Venue};
use crate::venues::{FetchStatus, Side, VenueFetchResult};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// A validated quote request. Inbound validation (well-formed symbol,
/// positive finite quantity) happens at the HTTP boundary before this
/// struct is constructed.
#[derive(Clone, Debug)]
pub struct QuoteRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: f64,
}

/// Per-venue slice of the response: a full impact payload, or a failure
/// tag with a short human-readable reason.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QuoteOutcome {
    Ok {
        impact: PriceImpact,
        /// Snapshot was older than the staleness threshold when used.
        stale: bool,
    },
    Timeout {
        reason: String,
    },
    Error {
        reason: String,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct VenueQuote {
    pub venue: Venue,
    #[serde(flatten)]
    pub outcome: QuoteOutcome,
}

/// The full response for one `(symbol, side, quantity)` request.
/// Constructed once, serialized, discarded; no cross-request state.
#[derive(Clone, Debug, Serialize)]
pub struct AggregatedQuote {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: f64,
    pub venues: Vec<VenueQuote>,
    /// Best venue for the requested side, or `None` when no venue can
    /// fill the order.
    pub best: Option<Venue>,
}

/// Combine per-venue fetch results into the response, running the impact
/// calculator once per successful venue.
///
/// Best venue: lowest total cost (BUY) or highest proceeds (SELL) among
/// fillable successes. Venues are evaluated in `Venue::ALL` priority
/// order with strict comparison, so an exact tie goes to the earliest
/// venue in that order.
pub fn assemble(
    request: &QuoteRequest,
    mut results: HashMap<Venue, VenueFetchResult>,
    stale_after: Duration,
) -> AggregatedQuote {
    let mut venues = Vec::with_capacity(results.len());
    let mut best: Option<(Venue, f64)> = None;

    for venue in Venue::ALL {
        let Some(result) = results.remove(&venue) else {
            continue;
        };
        let outcome = match result {
            VenueFetchResult::Success { book, volume_24h } => {
                let stale = book.is_stale(stale_after);
                let impact = compute_impact(request.side, request.quantity, &book, volume_24h);
                if impact.fillable {
                    let better = match &best {
                        None => true,
                        Some((_, cost)) => match request.side {
                            Side::Buy => impact.total_cost < *cost,
                            Side::Sell => impact.total_cost > *cost,
                        },
                    };
                    if better {
                        best = Some((venue, impact.total_cost));
                    }
                }
                QuoteOutcome::Ok { impact, stale }
            }
            VenueFetchResult::Failure { status, reason } => match status {
                FetchStatus::Timeout => QuoteOutcome::Timeout { reason },
                FetchStatus::Error => QuoteOutcome::Error { reason },
                FetchStatus::Unavailable => QuoteOutcome::Unavailable { reason },
            },
        };
        venues.push(VenueQuote { venue, outcome });
    }

    AggregatedQuote {
        symbol: request.symbol.clone(),
        side: request.side,
        quantity: request.quantity,
        venues,
        best: best.map(|(venue, _)| venue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venues::{BookLevel, OrderBookSnapshot};

    fn success(venue: Venue, asks: &[(f64, f64)], bids: &[(f64, f64)]) -> VenueFetchResult {
        VenueFetchResult::Success {
            book: OrderBookSnapshot::from_levels(
                venue,
                Symbol::new("BTC-USD"),
                bids.iter().map(|&(p, q)| BookLevel::new(p, q)).collect(),
                asks.iter().map(|&(p, q)| BookLevel::new(p, q)).collect(),
            ),
            volume_24h: Some(1000.0),
        }
    }

    fn buy_request(quantity: f64) -> QuoteRequest {
        QuoteRequest {
            symbol: Symbol::new("BTC-USD"),
            side: Side::Buy,
            quantity,
        }
    }

    const STALE: Duration = Duration::from_secs(5);

    #[test]
    fn best_buy_venue_is_the_cheapest_fillable_one() {
        let mut results = HashMap::new();
        results.insert(
            Venue::Binance,
            success(Venue::Binance, &[(101.0, 10.0)], &[(100.0, 1.0)]),
        );
        results.insert(
            Venue::Coinbase,
            success(Venue::Coinbase, &[(100.5, 10.0)], &[(100.0, 1.0)]),
        );
        results.insert(
            Venue::Kraken,
            success(Venue::Kraken, &[(102.0, 10.0)], &[(100.0, 1.0)]),
        );

        let quote = assemble(&buy_request(2.0), results, STALE);
        assert_eq!(quote.best, Some(Venue::Coinbase));
        assert_eq!(quote.venues.len(), 3);
    }

    #[test]
    fn best_sell_venue_is_the_highest_proceeds() {
        let mut results = HashMap::new();
        results.insert(
            Venue::Binance,
            success(Venue::Binance, &[(103.0, 1.0)], &[(100.0, 10.0)]),
        );
        results.insert(
            Venue::Kraken,
            success(Venue::Kraken, &[(103.0, 1.0)], &[(101.0, 10.0)]),
        );

        let request = QuoteRequest {
            symbol: Symbol::new("BTC-USD"),
            side: Side::Sell,
            quantity: 2.0,
        };
        let quote = assemble(&request, results, STALE);
        assert_eq!(quote.best, Some(Venue::Kraken));
    }

    #[test]
    fn unfillable_venues_are_excluded_from_best() {
        let mut results = HashMap::new();
        // Cheapest, but too shallow to fill.
        results.insert(
            Venue::Binance,
            success(Venue::Binance, &[(100.0, 1.0)], &[(99.0, 1.0)]),
        );
        results.insert(
            Venue::Coinbase,
            success(Venue::Coinbase, &[(105.0, 10.0)], &[(99.0, 1.0)]),
        );

        let quote = assemble(&buy_request(5.0), results, STALE);
        assert_eq!(quote.best, Some(Venue::Coinbase));
    }

    #[test]
    fn tie_goes_to_first_venue_in_priority_order() {
        let mut results = HashMap::new();
        results.insert(
            Venue::Kraken,
            success(Venue::Kraken, &[(101.0, 10.0)], &[(100.0, 1.0)]),
        );
        results.insert(
            Venue::Coinbase,
            success(Venue::Coinbase, &[(101.0, 10.0)], &[(100.0, 1.0)]),
        );

        let quote = assemble(&buy_request(2.0), results, STALE);
        // Coinbase precedes Kraken in Venue::ALL; an exact tie stays there.
        assert_eq!(quote.best, Some(Venue::Coinbase));
    }

    #[test]
    fn all_failed_is_a_valid_response_with_no_best() {
        let mut results = HashMap::new();
        for venue in Venue::ALL {
            results.insert(
                venue,
                VenueFetchResult::Failure {
                    status: FetchStatus::Error,
                    reason: "boom".to_string(),
                },
            );
        }

        let quote = assemble(&buy_request(1.0), results, STALE);
        assert_eq!(quote.best, None);
        assert_eq!(quote.venues.len(), 3);
        assert!(quote
            .venues
            .iter()
            .all(|v| matches!(v.outcome, QuoteOutcome::Error { .. })));
    }

    #[test]
    fn mixed_outcomes_keep_every_entry_and_pick_among_successes() {
        let mut results = HashMap::new();
        results.insert(
            Venue::Binance,
            VenueFetchResult::Failure {
                status: FetchStatus::Timeout,
                reason: "no response within 8000ms".to_string(),
            },
        );
        results.insert(
            Venue::Coinbase,
            success(Venue::Coinbase, &[(101.0, 10.0)], &[(100.0, 1.0)]),
        );
        results.insert(
            Venue::Kraken,
            success(Venue::Kraken, &[(100.5, 10.0)], &[(100.0, 1.0)]),
        );

        let quote = assemble(&buy_request(1.0), results, STALE);
        assert_eq!(quote.venues.len(), 3);
        assert!(quote
            .venues
            .iter()
            .any(|v| matches!(v.outcome, QuoteOutcome::Timeout { .. })));
        assert_eq!(quote.best, Some(Venue::Kraken));
    }

    #[test]
    fn stale_snapshots_are_flagged_in_the_response() {
        let old_book = {
            let mut book = OrderBookSnapshot::from_levels(
                Venue::Binance,
                Symbol::new("BTC-USD"),
                vec![BookLevel::new(100.0, 1.0)],
                vec![BookLevel::new(101.0, 10.0)],
            );
            book.captured_at = chrono::Utc::now() - chrono::Duration::seconds(10);
            book
        };
        let mut results = HashMap::new();
        results.insert(
            Venue::Binance,
            VenueFetchResult::Success {
                book: old_book,
                volume_24h: None,
            },
        );

        let quote = assemble(&buy_request(1.0), results, STALE);
        assert!(matches!(
            quote.venues[0].outcome,
            QuoteOutcome::Ok { stale: true, .. }
        ));
    }

    #[test]
    fn response_serializes_with_status_tags() {
        let mut results = HashMap::new();
        results.insert(
            Venue::Binance,
            success(Venue::Binance, &[(101.0, 10.0)], &[(100.0, 1.0)]),
        );
        results.insert(
            Venue::Kraken,
            VenueFetchResult::Failure {
                status: FetchStatus::Unavailable,
                reason: "FOO-BAR is not listed on Kraken".to_string(),
            },
        );

        let quote = assemble(&buy_request(1.0), results, STALE);
        let json = serde_json::to_value(&quote).expect("quote should serialize");
        let venues = json["venues"].as_array().expect("venues should be an array");
        assert!(venues
            .iter()
            .any(|v| v["status"] == "ok" && v["impact"]["avg_fill_price"] == 101.0));
        assert!(venues.iter().any(|v| v["status"] == "unavailable"));
        assert_eq!(json["best"], "binance");
    }
}
