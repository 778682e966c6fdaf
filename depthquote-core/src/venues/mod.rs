//! Venue client implementations

pub mod binance;
pub mod client;
pub mod coinbase;
pub mod errors;
pub mod kraken;
pub mod pacing;
pub mod types;

pub use binance::{BinanceClient, BinanceConfig};
pub use client::{RetryPolicy, VenueClient};
pub use coinbase::{CoinbaseClient, CoinbaseConfig};
pub use errors::VenueError;
pub use kraken::{KrakenClient, KrakenConfig};
pub use pacing::RequestPacer;
pub use types::{BookLevel, FetchStatus, OrderBookSnapshot, Side, VenueFetchResult};
