//! Network event watching.
//!
//! Demonstrates:
//! - Persistent subscriptions with `on`
//! - Typed event access via `Event::parse`
//! - Removing subscriptions with `off`
//!
//! Usage:
//!   cargo run --example 002_network_watch
//!   cargo run --example 002_network_watch -- --no-wait
//!   cargo run --example 002_network_watch -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use serde_json::json;

use cdp_client::{Connection, DiscoveryClient, ParsedEvent, Result};
use common::Args;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 002: Network Watch ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Discovering a page target...");

    let discovery = DiscoveryClient::new(&common::devtools_url())?;
    let target = discovery.first_page().await?;
    println!("        ✓ \"{}\" ({})\n", target.title, target.id);

    let connection = Connection::connect(target.ws_url()?).await?;

    // ========================================================================
    // Subscribe to request/response traffic
    // ========================================================================

    println!("[1] Watching network traffic (reload the page to see some)...\n");

    let requests = connection.on("Network.requestWillBeSent", |event| {
        if let ParsedEvent::NetworkRequestWillBeSent { method, url, .. } = event.parse() {
            println!("    → {method} {url}");
        }
    });

    let responses = connection.on("Network.responseReceived", |event| {
        if let ParsedEvent::NetworkResponseReceived { status, url, .. } = event.parse() {
            println!("    ← {status} {url}");
        }
    });

    connection.send("Network.enable", json!({})).await?;
    connection.send("Page.reload", json!({})).await?;

    common::wait_for_exit(args.no_wait).await;

    // ========================================================================
    // Teardown
    // ========================================================================

    connection.off("Network.requestWillBeSent", requests);
    connection.off("Network.responseReceived", responses);
    connection.send("Network.disable", json!({})).await?;

    connection.close();
    connection.closed().await;
    println!("\n=== Done ===");
    Ok(())
}
