//! HTTP boundary for quote requests
//!
//! Thin warp surface over the quote service. This layer owns the inbound
//! validation the core assumes has already happened: a well-formed
//! canonical symbol and a positive finite decimal quantity.

use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::quote::QuoteRequest;
use crate::venues::Side;
use crate::symbols::Symbol;
use crate::QuoteService;
use serde::Deserialize;
use serde_json::json;

/// Raw query parameters; quantity arrives as a decimal string.
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub symbol: String,
    pub side: String,
    pub quantity: String,
}

/// API server exposing the quote endpoint
pub struct QuoteApiServer {
    service: Arc<QuoteService>,
    port: u16,
}

impl QuoteApiServer {
    pub fn new(service: Arc<QuoteService>, port: u16) -> Self {
        Self { service, port }
    }

    /// Start serving; runs until the task is dropped.
    pub async fn start(&self) {
        let service = self.service.clone();

        let health = warp::path("health").and(warp::get()).map(|| {
            warp::reply::json(&json!({
                "status": "ok",
                "service": "depthquote",
                "timestamp": chrono::Utc::now()
            }))
        });

        let quote = warp::path!("api" / "v1" / "quote")
            .and(warp::get())
            .and(warp::query::<QuoteQuery>())
            .and(with_service(service))
            .and_then(handle_quote);

        let cors = warp::cors()
            .allow_any_origin()
            .allow_headers(vec!["content-type"])
            .allow_methods(vec!["GET", "OPTIONS"]);

        let routes = health.or(quote).with(cors);

        warp::serve(routes).run(([0, 0, 0, 0], self.port)).await;
    }
}

fn with_service(
    service: Arc<QuoteService>,
) -> impl Filter<Extract = (Arc<QuoteService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

async fn handle_quote(
    query: QuoteQuery,
    service: Arc<QuoteService>,
) -> Result<impl Reply, Rejection> {
    let request = match parse_request(&query) {
        Ok(request) => request,
        Err(message) => {
            return Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "error": message })),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    let quote = service.quote(&request).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&quote),
        StatusCode::OK,
    ))
}

fn parse_request(query: &QuoteQuery) -> Result<QuoteRequest, String> {
    let symbol = Symbol::new(query.symbol.trim().to_ascii_uppercase());
    if !symbol.validate() {
        return Err(format!(
            "symbol {:?} must be in BASE-QUOTE form",
            query.symbol
        ));
    }

    let side: Side = query.side.parse()?;

    let quantity: f64 = query
        .quantity
        .parse()
        .map_err(|_| format!("quantity {:?} is not a decimal number", query.quantity))?;
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err("quantity must be a positive finite number".to_string());
    }

    Ok(QuoteRequest {
        symbol,
        side,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(symbol: &str, side: &str, quantity: &str) -> QuoteQuery {
        QuoteQuery {
            symbol: symbol.to_string(),
            side: side.to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[test]
    fn valid_queries_parse() {
        let request = parse_request(&query("btc-usd", "buy", "1.5")).expect("should parse");
        assert_eq!(request.symbol, Symbol::new("BTC-USD"));
        assert_eq!(request.side, Side::Buy);
        assert_eq!(request.quantity, 1.5);
    }

    #[test]
    fn malformed_symbols_are_rejected() {
        assert!(parse_request(&query("BTCUSD", "buy", "1")).is_err());
        assert!(parse_request(&query("", "buy", "1")).is_err());
    }

    #[test]
    fn bad_sides_are_rejected() {
        assert!(parse_request(&query("BTC-USD", "hold", "1")).is_err());
    }

    #[test]
    fn non_positive_or_non_finite_quantities_are_rejected() {
        assert!(parse_request(&query("BTC-USD", "sell", "0")).is_err());
        assert!(parse_request(&query("BTC-USD", "sell", "-3")).is_err());
        assert!(parse_request(&query("BTC-USD", "sell", "inf")).is_err());
        assert!(parse_request(&query("BTC-USD", "sell", "NaN")).is_err());
        assert!(parse_request(&query("BTC-USD", "sell", "abc")).is_err());
    }
}
