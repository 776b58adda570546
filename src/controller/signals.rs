//! Selection signals.
//!
//! The site's markup for "this tab is selected" is not a contract, so
//! selection is an OR across several independent markers. Each marker is a
//! [`SelectionSignal`]. The built-in list comes from [`default_signals`], in
//! evaluation order, and callers can append their own when the markup drifts.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::identifiers::NodeId;
use crate::page::{By, Page, Selector};

// ============================================================================
// SelectionSignal
// ============================================================================

/// One way a tab can advertise that it is selected.
#[async_trait]
pub trait SelectionSignal: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if `node` shows this marker.
    async fn is_selected(&self, page: &dyn Page, node: NodeId) -> Result<bool>;
}

/// Built-in signals in evaluation order.
#[must_use]
pub fn default_signals() -> Vec<Box<dyn SelectionSignal>> {
    vec![
        Box::new(AriaSelected),
        Box::new(ClassMarker::default()),
        Box::new(DataSelected),
        Box::new(SelectedAncestor::default()),
    ]
}

// ============================================================================
// Built-in Signals
// ============================================================================

/// `aria-selected="true"` on the tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct AriaSelected;

#[async_trait]
impl SelectionSignal for AriaSelected {
    fn name(&self) -> &'static str {
        "aria-selected"
    }

    async fn is_selected(&self, page: &dyn Page, node: NodeId) -> Result<bool> {
        Ok(page.attribute(node, "aria-selected").await?.as_deref() == Some("true"))
    }
}

/// A marker class on the tab.
#[derive(Debug, Clone)]
pub struct ClassMarker {
    classes: &'static [&'static str],
}

impl Default for ClassMarker {
    fn default() -> Self {
        Self::new(&["selected", "active"])
    }
}

impl ClassMarker {
    /// Matches any of `classes`.
    #[must_use]
    pub const fn new(classes: &'static [&'static str]) -> Self {
        Self { classes }
    }
}

#[async_trait]
impl SelectionSignal for ClassMarker {
    fn name(&self) -> &'static str {
        "class"
    }

    async fn is_selected(&self, page: &dyn Page, node: NodeId) -> Result<bool> {
        for class in self.classes {
            if page.has_class(node, class).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// `data-selected="true"` on the tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataSelected;

#[async_trait]
impl SelectionSignal for DataSelected {
    fn name(&self) -> &'static str {
        "data-selected"
    }

    async fn is_selected(&self, page: &dyn Page, node: NodeId) -> Result<bool> {
        Ok(page.attribute(node, "data-selected").await?.as_deref() == Some("true"))
    }
}

/// The tab or a wrapper around it carries `aria-selected="true"`.
///
/// Covers composite widgets that put the state on an outer element.
#[derive(Debug, Clone)]
pub struct SelectedAncestor {
    selector: Selector,
}

impl Default for SelectedAncestor {
    fn default() -> Self {
        Self {
            selector: Selector::new(By::attribute_eq("aria-selected", "true")),
        }
    }
}

#[async_trait]
impl SelectionSignal for SelectedAncestor {
    fn name(&self) -> &'static str {
        "selected-ancestor"
    }

    async fn is_selected(&self, page: &dyn Page, node: NodeId) -> Result<bool> {
        Ok(page.closest(node, &self.selector).await?.is_some())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::page::{MemoryPage, NodeSpec};

    async fn check(spec: NodeSpec, signal: &dyn SelectionSignal) -> bool {
        let page = MemoryPage::new("https://x.com/", None);
        page.append(page.root(), spec).expect("append");
        let node = page.nodes_matching(&Selector::new(By::role("tab")))[0];
        signal.is_selected(&page, node).await.expect("signal")
    }

    fn tab() -> NodeSpec {
        NodeSpec::new("div").with_role("tab")
    }

    #[tokio::test]
    async fn test_aria_selected() {
        assert!(check(tab().with_attribute("aria-selected", "true"), &AriaSelected).await);
        assert!(!check(tab().with_attribute("aria-selected", "false"), &AriaSelected).await);
        assert!(!check(tab(), &AriaSelected).await);
    }

    #[tokio::test]
    async fn test_class_marker() {
        let signal = ClassMarker::default();
        assert!(check(tab().with_class("r-1").with_class("selected"), &signal).await);
        assert!(check(tab().with_class("active"), &signal).await);
        assert!(!check(tab().with_class("inactive"), &signal).await);
    }

    #[tokio::test]
    async fn test_data_selected() {
        assert!(check(tab().with_attribute("data-selected", "true"), &DataSelected).await);
        assert!(!check(tab().with_attribute("data-selected", ""), &DataSelected).await);
    }

    #[tokio::test]
    async fn test_selected_ancestor() {
        let signal = SelectedAncestor::default();
        let wrapped = NodeSpec::new("div")
            .with_attribute("aria-selected", "true")
            .with_child(tab());
        assert!(check(wrapped, &signal).await);
        assert!(check(tab().with_attribute("aria-selected", "true"), &signal).await);
        assert!(!check(NodeSpec::new("div").with_child(tab()), &signal).await);
    }

    #[tokio::test]
    async fn test_stale_node_is_an_error() {
        let page = MemoryPage::new("https://x.com/", None);
        let node = page.append(page.root(), tab()).expect("append");
        page.remove(node).expect("remove");

        assert!(AriaSelected.is_selected(&page, node).await.is_err());
    }

    #[test]
    fn test_default_order() {
        let names: Vec<_> = default_signals().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["aria-selected", "class", "data-selected", "selected-ancestor"]
        );
    }
}
