//! Venue error taxonomy

use super::types::FetchStatus;
use crate::symbols::{Symbol, Venue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VenueError {
    #[error("{symbol} is not listed on {venue}")]
    Unsupported { venue: Venue, symbol: Symbol },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("network timeout")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("venue API error: {0}")]
    Api(String),
}

impl VenueError {
    /// Only rate-limited failures are retried, locally with bounded
    /// exponential backoff. Everything else propagates immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Classification into the wire taxonomy the aggregator reports.
    /// A mapping miss is an expected outcome, not an error condition.
    pub fn fetch_status(&self) -> FetchStatus {
        match self {
            Self::Unsupported { .. } => FetchStatus::Unavailable,
            Self::Timeout => FetchStatus::Timeout,
            _ => FetchStatus::Error,
        }
    }
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.is_connect() {
            Self::Network(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VenueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limits_are_retryable() {
        assert!(VenueError::RateLimited { retry_after: None }.is_retryable());
        assert!(!VenueError::Timeout.is_retryable());
        assert!(!VenueError::Parse("bad json".into()).is_retryable());
        assert!(!VenueError::Unsupported {
            venue: Venue::Kraken,
            symbol: Symbol::new("FOO-BAR"),
        }
        .is_retryable());
    }

    #[test]
    fn wire_classification_matches_taxonomy() {
        let unsupported = VenueError::Unsupported {
            venue: Venue::Binance,
            symbol: Symbol::new("FOO-BAR"),
        };
        assert_eq!(unsupported.fetch_status(), FetchStatus::Unavailable);
        assert_eq!(VenueError::Timeout.fetch_status(), FetchStatus::Timeout);
        assert_eq!(
            VenueError::RateLimited { retry_after: Some(2) }.fetch_status(),
            FetchStatus::Error
        );
        assert_eq!(
            VenueError::Http {
                status: 500,
                message: "internal".into()
            }
            .fetch_status(),
            FetchStatus::Error
        );
    }
}
