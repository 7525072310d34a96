//! Discovery endpoint tour.
//!
//! Demonstrates:
//! - Browser/protocol version via `/json/version`
//! - Target listing via `/json/list`
//! - Opening a tab with `/json/new`
//! - Activating and closing it
//!
//! Usage:
//!   cargo run --example 003_targets
//!   cargo run --example 003_targets -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use cdp_client::{DiscoveryClient, Result};
use common::Args;

// ============================================================================
// Constants
// ============================================================================

const NEW_TAB_URL: &str = "https://example.com";

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
    println!("=== 003: Targets ===\n");

    let discovery = DiscoveryClient::new(&common::devtools_url())?;

    // ========================================================================
    // Version
    // ========================================================================

    println!("[1] Browser version...");

    let version = discovery.version().await?;
    println!("    Browser:  {}", version.browser);
    println!("    Protocol: {}", version.protocol_version);

    // ========================================================================
    // Target listing
    // ========================================================================

    println!("\n[2] Debuggable targets...");

    let targets = discovery.targets().await?;
    for target in &targets {
        println!(
            "    [{}] \"{}\" {}",
            target.target_type, target.title, target.url
        );
    }
    println!("    ✓ {} target(s)", targets.len());

    // ========================================================================
    // Open, activate, close a tab
    // ========================================================================

    println!("\n[3] Opening a tab at {NEW_TAB_URL}...");

    let tab = discovery.new_tab(Some(NEW_TAB_URL)).await?;
    println!("    ✓ Opened ({})", tab.id);

    discovery.activate(&tab.id).await?;
    println!("    ✓ Activated");

    discovery.close_target(&tab.id).await?;
    println!("    ✓ Closed");

    println!("\n=== Done ===");
    Ok(())
}
