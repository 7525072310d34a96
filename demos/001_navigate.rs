//! Basic navigation round trip.
//!
//! Demonstrates:
//! - Target discovery via `/json/list`
//! - Connecting to a page target
//! - Sending commands and awaiting results
//! - One-shot subscription to `Page.loadEventFired`
//!
//! Usage:
//!   cargo run --example 001_navigate
//!   cargo run --example 001_navigate -- --debug
//!
//! The browser must be running with `--remote-debugging-port=9222`, or
//! set `CDP_URL` to its debugging endpoint.

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

use cdp_client::{Connection, DiscoveryClient, Result};
use common::Args;

// ============================================================================
// Constants
// ============================================================================

const URL: &str = "https://example.com";
const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== 001: Navigate ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Discovering a page target...");

    let discovery = DiscoveryClient::new(&common::devtools_url())?;
    let target = discovery.first_page().await?;
    println!("        ✓ \"{}\" ({})\n", target.title, target.id);

    let connection = Connection::connect(target.ws_url()?).await?;

    // ========================================================================
    // Navigate
    // ========================================================================

    println!("[1] Navigate to {URL}...");

    let (load_tx, mut load_rx) = mpsc::unbounded_channel();
    connection.once("Page.loadEventFired", move |event| {
        let _ = load_tx.send(event.params.clone());
    });

    connection.send("Page.enable", json!({})).await?;
    let frame = connection.send("Page.navigate", json!({"url": URL})).await?;
    println!("    ✓ Navigation started (frame {})", frame["frameId"]);

    match timeout(LOAD_TIMEOUT, load_rx.recv()).await {
        Ok(Some(params)) => println!("    ✓ Loaded at timestamp {}", params["timestamp"]),
        _ => println!("    ✗ No load event within {LOAD_TIMEOUT:?}"),
    }

    // ========================================================================
    // Read back the location
    // ========================================================================

    println!("\n[2] Current history entry...");

    let history = connection
        .send("Page.getNavigationHistory", json!({}))
        .await?;
    let index = history["currentIndex"].as_u64().unwrap_or(0) as usize;
    println!("    URL: {}", history["entries"][index]["url"]);

    // ========================================================================
    // Teardown
    // ========================================================================

    connection.close();
    connection.closed().await;
    println!("\n=== Done ===");
    Ok(())
}
