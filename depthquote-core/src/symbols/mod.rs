//! Canonical symbols and venue identities

pub mod catalog;
pub mod rules;

pub use catalog::SymbolCatalog;
pub use rules::{denormalize, normalize};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical trading pair in `BASE-QUOTE` form (e.g. `BTC-USD`).
///
/// Stablecoins keep their own quote token: `BTC-USDT`, `BTC-USDC` and
/// `BTC-USD` are three distinct symbols and are never merged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Two non-empty uppercase alphanumeric tokens joined by a single dash.
    pub fn validate(&self) -> bool {
        match self.parts() {
            Some((base, quote)) => Self::valid_token(base) && Self::valid_token(quote),
            None => false,
        }
    }

    fn valid_token(token: &str) -> bool {
        !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    /// Split into `(base, quote)`; `None` when not in canonical form.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let (base, quote) = self.0.split_once('-')?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some((base, quote))
    }

    pub fn base(&self) -> Option<&str> {
        self.parts().map(|(b, _)| b)
    }

    pub fn quote(&self) -> Option<&str> {
        self.parts().map(|(_, q)| q)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A trading venue acting as an independent market-data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Binance,
    Coinbase,
    Kraken,
}

impl Venue {
    /// Fixed priority order. Best-venue selection walks this order, so an
    /// exact cost tie resolves to the earliest venue listed here.
    pub const ALL: [Venue; 3] = [Venue::Binance, Venue::Coinbase, Venue::Kraken];

    pub fn name(&self) -> &'static str {
        match self {
            Venue::Binance => "Binance",
            Venue::Coinbase => "Coinbase",
            Venue::Kraken => "Kraken",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_symbols_validate() {
        assert!(Symbol::new("BTC-USD").validate());
        assert!(Symbol::new("ETH-USDT").validate());
        assert!(Symbol::new("1INCH-USD").validate());
    }

    #[test]
    fn malformed_symbols_are_rejected() {
        assert!(!Symbol::new("BTCUSD").validate());
        assert!(!Symbol::new("btc-usd").validate());
        assert!(!Symbol::new("-USD").validate());
        assert!(!Symbol::new("BTC-").validate());
        assert!(!Symbol::new("BTC-USD-PERP").validate());
        assert!(!Symbol::new("").validate());
    }

    #[test]
    fn parts_splits_base_and_quote() {
        let symbol = Symbol::new("SOL-USDC");
        assert_eq!(symbol.parts(), Some(("SOL", "USDC")));
        assert_eq!(symbol.base(), Some("SOL"));
        assert_eq!(symbol.quote(), Some("USDC"));
    }

    #[test]
    fn venue_priority_order_is_stable() {
        assert_eq!(
            Venue::ALL,
            [Venue::Binance, Venue::Coinbase, Venue::Kraken]
        );
    }
}
