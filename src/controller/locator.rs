//! Target locator.
//!
//! The home timeline shows a two-tab strip inside the main landmark. The
//! second tab is "Following". Nothing else identifies it reliably across
//! languages, so the locator goes by position.
//!
//! The lookup is a fresh query on every call. Handles are never cached
//! because the page re-renders the strip at will.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::error::Result;
use crate::identifiers::NodeId;
use crate::page::{By, Page, Selector};

use super::signals::{SelectionSignal, default_signals};

// ============================================================================
// Constants
// ============================================================================

/// Position of "Following" in the tab strip.
pub const TARGET_TAB_INDEX: usize = 1;

/// `main [role="tablist"] [role="tab"]`.
#[must_use]
pub fn primary_tabs() -> Selector {
    Selector::new(By::tag("main"))
        .descendant(By::role("tablist"))
        .descendant(By::role("tab"))
}

// ============================================================================
// TargetLocator
// ============================================================================

/// Finds the target tab and reads its selection state.
#[derive(Debug)]
pub struct TargetLocator {
    selector: Selector,
    index: usize,
    signals: Vec<Box<dyn SelectionSignal>>,
}

impl Default for TargetLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetLocator {
    /// Locator for the second primary tab with the built-in signals.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selector: primary_tabs(),
            index: TARGET_TAB_INDEX,
            signals: default_signals(),
        }
    }

    /// Appends a selection signal after the built-in ones.
    #[must_use]
    pub fn with_signal(mut self, signal: impl SelectionSignal + 'static) -> Self {
        self.signals.push(Box::new(signal));
        self
    }

    /// Selector used to list the tabs.
    #[inline]
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Names of the active signals, in evaluation order.
    #[must_use]
    pub fn signal_names(&self) -> Vec<&'static str> {
        self.signals.iter().map(|s| s.name()).collect()
    }

    /// Returns the target tab, or `None` when fewer than two tabs exist.
    ///
    /// # Errors
    ///
    /// Propagates page query errors.
    pub async fn find_target_tab(&self, page: &dyn Page) -> Result<Option<NodeId>> {
        let tabs = page.query_all(&self.selector).await?;
        Ok(tabs.get(self.index).copied())
    }

    /// Returns `true` if any signal reports `node` as selected.
    ///
    /// A signal that errors counts as not selected.
    pub async fn is_selected(&self, page: &dyn Page, node: NodeId) -> bool {
        for signal in &self.signals {
            match signal.is_selected(page, node).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!(signal = signal.name(), %node, error = %e, "Selection check failed"),
            }
        }
        false
    }

    /// Resolves the target and checks it. Absent target means not selected.
    pub async fn is_target_selected(&self, page: &dyn Page) -> bool {
        match self.find_target_tab(page).await {
            Ok(Some(node)) => self.is_selected(page, node).await,
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "Target lookup failed");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
