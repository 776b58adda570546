//! Shared fixtures for integration tests.

#![allow(dead_code)]

use following_tab::controller::primary_tabs;
use following_tab::{MemoryPage, NodeId, NodeSpec};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("following_tab=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A `role="tab"` element.
pub fn tab() -> NodeSpec {
    NodeSpec::new("div").with_role("tab")
}

/// Home timeline tab strip: a selected "For you" tab followed by `target`.
pub fn tab_strip(target: NodeSpec) -> NodeSpec {
    NodeSpec::new("main").with_child(
        NodeSpec::new("div").with_role("tablist").with_children([
            tab().with_attribute("aria-selected", "true"),
            target,
        ]),
    )
}

/// Home page with an unselected "Following" tab already rendered.
pub fn rendered_home(url: &str, referrer: Option<&str>) -> MemoryPage {
    let page = MemoryPage::new(url, referrer);
    page.append(page.root(), tab_strip(tab().with_attribute("aria-selected", "false")))
        .expect("append tab strip");
    page
}

/// Current handle of the "Following" tab.
pub fn target(page: &MemoryPage) -> NodeId {
    page.nodes_matching(&primary_tabs())[1]
}

/// Makes clicks on the target select it, the way the real page does.
pub fn select_on_click(page: &MemoryPage) {
    page.on_activate(|page, node, _| page.set_attribute(node, "aria-selected", "true"));
}
