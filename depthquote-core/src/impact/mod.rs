//! Price-impact calculation
//!
//! Pure book-walking: no I/O, no shared state. A BUY consumes liquidity
//! offered to sell and walks the ask ladder from the lowest price up; a
//! SELL walks the bid ladder from the highest price down.

use crate::venues::{OrderBookSnapshot, Side};
use serde::Serialize;

/// Outcome of walking one venue's book with a requested quantity.
#[derive(Clone, Debug, Serialize)]
pub struct PriceImpact {
    pub side: Side,
    pub requested_quantity: f64,
    pub filled_quantity: f64,
    /// Volume-weighted fill price; zero when nothing filled.
    pub avg_fill_price: f64,
    /// Total notional exchanged (sum of price x filled quantity).
    pub total_cost: f64,
    pub mid_price: f64,
    pub best_bid: f64,
    pub best_ask: f64,
    /// Signed deviation of the fill from mid, in percent. Positive means
    /// the buyer paid above mid; a sell below mid comes out negative.
    /// The same formula applies to both sides on purpose.
    pub impact_pct: f64,
    /// Requested size as a percentage of 24h volume; `None` when the
    /// volume is unknown ("unknown" and "zero impact" are distinct).
    pub volume_pct: Option<f64>,
    pub levels_consumed: usize,
    pub fillable: bool,
    /// Quantity left unfilled after exhausting the relevant side.
    pub shortfall: f64,
}

/// Walk the relevant side of `book` until `quantity` is filled or the
/// side runs dry. Levels may be partially consumed.
pub fn compute_impact(
    side: Side,
    quantity: f64,
    book: &OrderBookSnapshot,
    volume_24h: Option<f64>,
) -> PriceImpact {
    let best_bid = book.best_bid().unwrap_or(0.0);
    let best_ask = book.best_ask().unwrap_or(0.0);
    let mid_price = book.mid_price().unwrap_or(0.0);

    let ladder = match side {
        Side::Buy => &book.asks,
        Side::Sell => &book.bids,
    };

    let mut remaining = quantity;
    let mut total_cost = 0.0;
    let mut levels_consumed = 0;
    for level in ladder {
        if remaining <= 0.0 {
            break;
        }
        if level.quantity <= 0.0 {
            continue;
        }
        let take = remaining.min(level.quantity);
        total_cost += take * level.price;
        remaining -= take;
        levels_consumed += 1;
    }

    let filled_quantity = quantity - remaining;
    let avg_fill_price = if filled_quantity > 0.0 {
        total_cost / filled_quantity
    } else {
        0.0
    };
    let impact_pct = if mid_price > 0.0 && filled_quantity > 0.0 {
        (avg_fill_price - mid_price) / mid_price * 100.0
    } else {
        0.0
    };
    let volume_pct = match volume_24h {
        Some(volume) if volume > 0.0 => Some(quantity / volume * 100.0),
        _ => None,
    };
    let shortfall = remaining.max(0.0);

    PriceImpact {
        side,
        requested_quantity: quantity,
        filled_quantity,
        avg_fill_price,
        total_cost,
        mid_price,
        best_bid,
        best_ask,
        impact_pct,
        volume_pct,
        levels_consumed,
        fillable: shortfall == 0.0,
        shortfall,
    }
}
