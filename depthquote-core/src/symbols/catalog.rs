//! Symbol catalog for cross-venue translation

use super::{rules, Symbol, Venue};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bidirectional symbol catalog, preloaded with the common pairs and
/// learning rule-derived mappings as they are seen.
///
/// Read-mostly and shared across concurrent aggregation requests; the
/// explicit entries also override the rule tables where a venue's real
/// listing deviates from its own conventions.
pub struct SymbolCatalog {
    canonical_to_native: DashMap<(Symbol, Venue), String>,
    native_to_canonical: DashMap<(String, Venue), Symbol>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SymbolCatalog {
    pub fn new() -> Self {
        let catalog = Self {
            canonical_to_native: DashMap::new(),
            native_to_canonical: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        };
        catalog.preload_mappings();
        catalog
    }

    fn preload_mappings(&self) {
        // Bitcoin
        self.add_mapping(Symbol::new("BTC-USD"), Venue::Binance, "BTCUSD");
        self.add_mapping(Symbol::new("BTC-USD"), Venue::Coinbase, "BTC-USD");
        self.add_mapping(Symbol::new("BTC-USD"), Venue::Kraken, "XXBTZUSD");
        self.add_mapping(Symbol::new("BTC-USDT"), Venue::Binance, "BTCUSDT");
        self.add_mapping(Symbol::new("BTC-USDT"), Venue::Coinbase, "BTC-USDT");
        self.add_mapping(Symbol::new("BTC-USDT"), Venue::Kraken, "XBTUSDT");

        // Ethereum
        self.add_mapping(Symbol::new("ETH-USD"), Venue::Binance, "ETHUSD");
        self.add_mapping(Symbol::new("ETH-USD"), Venue::Coinbase, "ETH-USD");
        self.add_mapping(Symbol::new("ETH-USD"), Venue::Kraken, "XETHZUSD");
        self.add_mapping(Symbol::new("ETH-USDT"), Venue::Binance, "ETHUSDT");
        self.add_mapping(Symbol::new("ETH-USDT"), Venue::Kraken, "ETHUSDT");

        // Other majors
        self.add_mapping(Symbol::new("SOL-USD"), Venue::Binance, "SOLUSD");
        self.add_mapping(Symbol::new("SOL-USD"), Venue::Coinbase, "SOL-USD");
        self.add_mapping(Symbol::new("SOL-USD"), Venue::Kraken, "SOLUSD");
        self.add_mapping(Symbol::new("XRP-USD"), Venue::Coinbase, "XRP-USD");
        self.add_mapping(Symbol::new("XRP-USD"), Venue::Kraken, "XXRPZUSD");
        self.add_mapping(Symbol::new("ADA-USD"), Venue::Binance, "ADAUSD");
        self.add_mapping(Symbol::new("ADA-USD"), Venue::Coinbase, "ADA-USD");
        self.add_mapping(Symbol::new("ADA-USD"), Venue::Kraken, "ADAUSD");
        self.add_mapping(Symbol::new("DOGE-USD"), Venue::Binance, "DOGEUSD");
        self.add_mapping(Symbol::new("DOGE-USD"), Venue::Coinbase, "DOGE-USD");
        self.add_mapping(Symbol::new("DOGE-USD"), Venue::Kraken, "XDGUSD");

        // Cross pairs
        self.add_mapping(Symbol::new("ETH-BTC"), Venue::Binance, "ETHBTC");
        self.add_mapping(Symbol::new("ETH-BTC"), Venue::Coinbase, "ETH-BTC");
        self.add_mapping(Symbol::new("ETH-BTC"), Venue::Kraken, "XETHXXBT");
    }

    pub fn add_mapping(&self, canonical: Symbol, venue: Venue, native: &str) {
        self.canonical_to_native
            .insert((canonical.clone(), venue), native.to_string());
        self.native_to_canonical
            .insert((native.to_string(), venue), canonical);
    }

    /// Canonical -> venue-native spelling. Falls back to the venue's rule
    /// table and learns the result. `None` means the pair has no spelling
    /// on that venue.
    pub fn to_native(&self, symbol: &Symbol, venue: Venue) -> Option<String> {
        if let Some(hit) = self.canonical_to_native.get(&(symbol.clone(), venue)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(hit.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let native = rules::denormalize(symbol, venue)?;
        self.add_mapping(symbol.clone(), venue, &native);
        Some(native)
    }

    /// Venue-native spelling -> canonical. Falls back to the venue's rule
    /// table and learns the result.
    pub fn from_native(&self, native: &str, venue: Venue) -> Option<Symbol> {
        if let Some(hit) = self.native_to_canonical.get(&(native.to_string(), venue)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(hit.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let canonical = rules::normalize(native, venue)?;
        self.add_mapping(canonical.clone(), venue, native);
        Some(canonical)
    }

    pub fn cache_stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::new()
    }
}
