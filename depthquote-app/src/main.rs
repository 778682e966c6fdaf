//! Depthquote application
//!
//! One-shot CLI quoting (`depthquote BTC-USD buy 1.5`) or, with no
//! arguments, the HTTP quote API until interrupted.

use anyhow::Result;
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use depthquote_core::{
    QuoteApiServer, QuoteConfig, QuoteRequest, QuoteService, Side, Symbol,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        )
        .init();

    let service = Arc::new(QuoteService::with_default_venues(QuoteConfig::default())?);

    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        return one_shot_quote(&service, &args).await;
    }

    let port: u16 = env::var("DEPTHQUOTE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!("🚀 Starting depthquote API server on port {}", port);
    let server = QuoteApiServer::new(service.clone(), port);
    let server_task = tokio::spawn(async move { server.start().await });

    info!("📊 Serving quotes. Press Ctrl+C to stop.");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("🛑 Shutdown signal received");
        }
        _ = server_task => {
            info!("API server stopped");
        }
    }

    let stats = service.stats();
    info!(
        "✅ Served {} quotes ({} venue failures), shutting down",
        stats.quotes_served, stats.venue_failures
    );
    Ok(())
}

async fn one_shot_quote(service: &QuoteService, args: &[String]) -> Result<()> {
    anyhow::ensure!(
        args.len() == 3,
        "usage: depthquote <SYMBOL> <buy|sell> <quantity>"
    );

    let symbol = Symbol::new(args[0].trim().to_ascii_uppercase());
    anyhow::ensure!(
        symbol.validate(),
        "symbol {:?} must be in BASE-QUOTE form, e.g. BTC-USD",
        args[0]
    );

    let side: Side = args[1]
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let quantity: f64 = args[2].parse()?;
    anyhow::ensure!(
        quantity.is_finite() && quantity > 0.0,
        "quantity must be a positive number"
    );

    let quote = service
        .quote(&QuoteRequest {
            symbol,
            side,
            quantity,
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}
