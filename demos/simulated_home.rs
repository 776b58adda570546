//! Simulated home timeline.
//!
//! Opens an in-memory x.com home page that renders its tab strip late,
//! starts the tab selector, and prints how the page load ended.
//!
//! Run with: RUST_LOG=following_tab=debug cargo run --example simulated_home

use std::sync::Arc;
use std::time::Duration;

use following_tab::{
    MemoryPage, NodeSpec, PopupStatus, ReadyState, TabSelector, TabSelectorConfig,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Configuration
// ============================================================================

const URL: &str = "https://x.com/home";
const REFERRER: &str = "https://www.google.com/";
const RENDER_DELAY: Duration = Duration::from_millis(750);

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Popup: {}", PopupStatus::for_tab_url(Some(URL)).message());

    let page = Arc::new(
        MemoryPage::new(URL, Some(REFERRER)).with_ready_state(ReadyState::Loading),
    );
    page.on_activate(|page, node, _| page.set_attribute(node, "aria-selected", "true"));

    let unload = CancellationToken::new();
    let selector = TabSelector::with_config(page.clone(), TabSelectorConfig::new())?
        .with_cancellation(&unload);
    println!("Page load {}", selector.load_id());
    let handle = selector.spawn();

    page.set_ready_state(ReadyState::Interactive);

    sleep(RENDER_DELAY).await;
    println!("Rendering tab strip");
    page.append(page.root(), tab_strip())?;

    let outcome = handle.await?;
    println!("\n=== Outcome ===");
    match outcome.state() {
        Some(state) => {
            println!("Phase:    {:?}", state.phase());
            println!("Attempts: {}", state.attempts());
            println!("Retries:  {}", state.retry_count());
        }
        None => println!("Skipped: {outcome:?}"),
    }
    println!("Clicks:   {}", page.click_count());

    Ok(())
}

fn tab_strip() -> NodeSpec {
    let tab = |label: &str| {
        NodeSpec::new("a")
            .with_role("tab")
            .with_attribute("href", "/home")
            .with_child(NodeSpec::new("span").with_attribute("data-label", label))
    };

    NodeSpec::new("main").with_child(NodeSpec::new("div").with_role("tablist").with_children([
        tab("For you").with_attribute("aria-selected", "true"),
        tab("Following").with_attribute("aria-selected", "false"),
    ]))
}
