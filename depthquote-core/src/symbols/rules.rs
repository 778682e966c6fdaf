//! Per-venue symbol spelling rules
//!
//! Each venue spells the same pair differently. The rules live in small
//! ordered tables so a new venue slots in without touching call sites.
//! Both directions are pure and total: an unmapped symbol is an expected
//! outcome and comes back as `None`, never as an error.

use super::{Symbol, Venue};

/// Quote currencies Binance concatenates onto the base, longest first.
/// Longest-first matters: `USDTUSD` must parse as USDT/USD.
const BINANCE_QUOTES: &[&str] = &[
    "FDUSD", "USDT", "USDC", "BUSD", "USD", "EUR", "GBP", "TRY", "BRL", "JPY", "BTC", "ETH", "BNB",
];

/// Kraken renames a few assets outright (canonical, native).
const KRAKEN_RENAMES: &[(&str, &str)] = &[("BTC", "XBT"), ("DOGE", "XDG")];

/// Legacy crypto assets that carry Kraken's `X` marker in classic pairs.
const KRAKEN_X_ASSETS: &[&str] = &["XBT", "ETH", "LTC", "XRP", "XLM", "MLN", "REP", "ZEC"];

/// Fiat assets that carry the `Z` marker in classic pairs.
const KRAKEN_Z_ASSETS: &[&str] = &["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF"];

/// Quote suffixes for modern (unmarked) Kraken pairs, longest first.
const KRAKEN_PLAIN_QUOTES: &[&str] = &[
    "USDT", "USDC", "USD", "EUR", "GBP", "CAD", "AUD", "CHF", "XBT", "ETH",
];

/// Venue-native spelling -> canonical symbol. `None` means the venue has
/// no recognizable listing for that spelling.
pub fn normalize(native: &str, venue: Venue) -> Option<Symbol> {
    let native = native.trim().to_ascii_uppercase();
    if native.is_empty() {
        return None;
    }
    let symbol = match venue {
        Venue::Binance => binance_normalize(&native)?,
        Venue::Coinbase => Symbol::new(native),
        Venue::Kraken => kraken_normalize(&native)?,
    };
    symbol.validate().then_some(symbol)
}

/// Canonical symbol -> venue-native spelling. `None` when the venue's
/// rules cannot express the pair (e.g. an unknown quote currency).
pub fn denormalize(symbol: &Symbol, venue: Venue) -> Option<String> {
    if !symbol.validate() {
        return None;
    }
    let (base, quote) = symbol.parts()?;
    match venue {
        Venue::Binance => BINANCE_QUOTES
            .contains(&quote)
            .then(|| format!("{}{}", base, quote)),
        Venue::Coinbase => Some(symbol.as_str().to_string()),
        Venue::Kraken => kraken_denormalize(base, quote),
    }
}

fn binance_normalize(native: &str) -> Option<Symbol> {
    for &quote in BINANCE_QUOTES {
        if let Some(base) = native.strip_suffix(quote) {
            if !base.is_empty() {
                return Some(Symbol::new(format!("{}-{}", base, quote)));
            }
        }
    }
    None
}

fn kraken_native_asset(canonical: &str) -> &str {
    KRAKEN_RENAMES
        .iter()
        .find(|(c, _)| *c == canonical)
        .map(|(_, n)| *n)
        .unwrap_or(canonical)
}

fn kraken_canonical_asset(native: &str) -> &str {
    KRAKEN_RENAMES
        .iter()
        .find(|(_, n)| *n == native)
        .map(|(c, _)| *c)
        .unwrap_or(native)
}

fn kraken_denormalize(base: &str, quote: &str) -> Option<String> {
    let native_base = kraken_native_asset(base);
    let native_quote = kraken_native_asset(quote);

    // Classic marked form only when both sides are legacy assets:
    // BTC-USD -> XXBTZUSD, ETH-BTC -> XETHXXBT.
    if KRAKEN_X_ASSETS.contains(&native_base) {
        if KRAKEN_Z_ASSETS.contains(&native_quote) {
            return Some(format!("X{}Z{}", native_base, native_quote));
        }
        if KRAKEN_X_ASSETS.contains(&native_quote) {
            return Some(format!("X{}X{}", native_base, native_quote));
        }
    }

    // Everything else is a plain concatenation of native names: SOLUSD,
    // XBTUSDT, XDGUSD.
    KRAKEN_PLAIN_QUOTES
        .contains(&native_quote)
        .then(|| format!("{}{}", native_base, native_quote))
}

fn kraken_normalize(native: &str) -> Option<Symbol> {
    // Classic marked pairs first: XXBTZUSD, XETHXXBT.
    for &quote in KRAKEN_Z_ASSETS {
        if let Some(marked_base) = native.strip_suffix(&format!("Z{}", quote)) {
            if let Some(symbol) = kraken_unmark_base(marked_base, quote) {
                return Some(symbol);
            }
        }
    }
    for &quote in KRAKEN_X_ASSETS {
        if let Some(marked_base) = native.strip_suffix(&format!("X{}", quote)) {
            if let Some(symbol) = kraken_unmark_base(marked_base, kraken_canonical_asset(quote)) {
                return Some(symbol);
            }
        }
    }

    // Modern plain pairs: SOLUSD, XBTUSDT, XDGUSD.
    for &quote in KRAKEN_PLAIN_QUOTES {
        if let Some(base) = native.strip_suffix(quote) {
            if !base.is_empty() {
                return Some(Symbol::new(format!(
                    "{}-{}",
                    kraken_canonical_asset(base),
                    kraken_canonical_asset(quote)
                )));
            }
        }
    }
    None
}

fn kraken_unmark_base(marked_base: &str, canonical_quote: &str) -> Option<Symbol> {
    let base = marked_base.strip_prefix('X')?;
    if !KRAKEN_X_ASSETS.contains(&base) {
        return None;
    }
    Some(Symbol::new(format!(
        "{}-{}",
        kraken_canonical_asset(base),
        canonical_quote
    )))
}
