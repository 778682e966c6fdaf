//! Market data types shared across venue clients

use crate::symbols::{Symbol, Venue};
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Order side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

/// One resting liquidity level: price and quantity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BookLevel {
    pub price: f64,
    pub quantity: f64,
}

impl BookLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

/// Point-in-time orderbook snapshot for one venue.
///
/// Bids are descending and asks ascending by price, strictly monotonic
/// within a side. Snapshots are never mutated and never cached across
/// requests; each quote re-fetches fresh depth.
#[derive(Clone, Debug, Serialize)]
pub struct OrderBookSnapshot {
    pub venue: Venue,
    pub symbol: Symbol,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub captured_at: DateTime<Utc>,
}

impl OrderBookSnapshot {
    /// Build a snapshot from levels in whatever order the venue returned
    /// them, restoring side ordering and merging duplicate prices.
    pub fn from_levels(
        venue: Venue,
        symbol: Symbol,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
    ) -> Self {
        let mut bids = merge_duplicate_prices(bids);
        let mut asks = merge_duplicate_prices(asks);
        bids.sort_by_key(|level| std::cmp::Reverse(OrderedFloat(level.price)));
        asks.sort_by_key(|level| OrderedFloat(level.price));
        Self {
            venue,
            symbol,
            bids,
            asks,
            captured_at: Utc::now(),
        }
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|level| level.price)
    }

    /// Midpoint of best bid and best ask; defined only when both sides
    /// are non-empty with positive prices.
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        if bid > 0.0 && ask > 0.0 {
            Some((bid + ask) / 2.0)
        } else {
            None
        }
    }

    /// Strict price monotonicity per side and non-negative quantities.
    pub fn validate(&self) -> bool {
        let bids_ordered = self
            .bids
            .windows(2)
            .all(|pair| pair[0].price > pair[1].price);
        let asks_ordered = self
            .asks
            .windows(2)
            .all(|pair| pair[0].price < pair[1].price);
        let quantities_ok = self
            .bids
            .iter()
            .chain(self.asks.iter())
            .all(|level| level.quantity >= 0.0 && level.price.is_finite());
        bids_ordered && asks_ordered && quantities_ok
    }

    pub fn age(&self) -> Duration {
        (Utc::now() - self.captured_at).to_std().unwrap_or_default()
    }

    /// A snapshot older than the threshold at the moment of use must be
    /// flagged stale to the caller.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.age() > threshold
    }
}

fn merge_duplicate_prices(levels: Vec<BookLevel>) -> Vec<BookLevel> {
    let mut merged: Vec<BookLevel> = Vec::with_capacity(levels.len());
    for level in levels {
        match merged
            .iter_mut()
            .find(|existing| existing.price == level.price)
        {
            Some(existing) => existing.quantity += level.quantity,
            None => merged.push(level),
        }
    }
    merged
}

/// Wire classification of a failed venue fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Timeout,
    Error,
    Unavailable,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Timeout => write!(f, "timeout"),
            FetchStatus::Error => write!(f, "error"),
            FetchStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Outcome of one venue's fetch within a single aggregation call.
/// Produced exactly once per venue; never retried after the aggregator
/// has moved on.
#[derive(Clone, Debug)]
pub enum VenueFetchResult {
    Success {
        book: OrderBookSnapshot,
        /// 24h base-asset volume; `None` when the venue could not report
        /// it (the book still stands).
        volume_24h: Option<f64>,
    },
    Failure {
        status: FetchStatus,
        reason: String,
    },
}

impl VenueFetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, VenueFetchResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(bids: &[(f64, f64)], asks: &[(f64, f64)]) -> OrderBookSnapshot {
        OrderBookSnapshot::from_levels(
            Venue::Binance,
            Symbol::new("BTC-USD"),
            bids.iter().map(|&(p, q)| BookLevel::new(p, q)).collect(),
            asks.iter().map(|&(p, q)| BookLevel::new(p, q)).collect(),
        )
    }

    #[test]
    fn from_levels_restores_side_ordering() {
        let book = snapshot(&[(99.0, 1.0), (100.0, 2.0)], &[(102.0, 1.0), (101.0, 2.0)]);
        assert_eq!(book.best_bid(), Some(100.0));
        assert_eq!(book.best_ask(), Some(101.0));
        assert!(book.validate());
    }

    #[test]
    fn duplicate_price_levels_are_merged() {
        let book = snapshot(&[(100.0, 1.0), (100.0, 2.0)], &[(101.0, 1.0)]);
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.bids[0].quantity, 3.0);
        assert!(book.validate());
    }

    #[test]
    fn mid_price_requires_both_sides() {
        assert_eq!(snapshot(&[], &[(101.0, 1.0)]).mid_price(), None);
        assert_eq!(snapshot(&[(100.0, 1.0)], &[]).mid_price(), None);
        assert_eq!(
            snapshot(&[(100.0, 1.0)], &[(101.0, 1.0)]).mid_price(),
            Some(100.5)
        );
    }

    #[test]
    fn stale_snapshots_are_flagged() {
        let mut book = snapshot(&[(100.0, 1.0)], &[(101.0, 1.0)]);
        assert!(!book.is_stale(Duration::from_secs(5)));
        book.captured_at = Utc::now() - chrono::Duration::seconds(6);
        assert!(book.is_stale(Duration::from_secs(5)));
    }

    #[test]
    fn negative_quantities_fail_validation() {
        let book = snapshot(&[(100.0, -1.0)], &[(101.0, 1.0)]);
        assert!(!book.validate());
    }
}
