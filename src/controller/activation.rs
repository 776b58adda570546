//! Single activation attempt.
//!
//! An attempt clicks the target tab through two mechanisms, `click()` and a
//! dispatched bubbling `click` event, because the page's framework may only
//! listen to one of them. It then waits for the page to settle and reads the
//! selection state back. A failed attempt is the normal case while the page
//! is still rendering, so nothing here returns an error.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::TabSelectorConfig;
use crate::page::{Page, SyntheticEvent};

use super::locator::TargetLocator;

// ============================================================================
// ActivationOutcome
// ============================================================================

/// Result of one activation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Target was already selected; nothing was clicked.
    AlreadySelected,
    /// Clicked and the page now shows the target selected.
    Selected,
    /// Clicked but the selection did not change.
    NotSelected,
    /// Target not rendered yet.
    TargetMissing,
    /// The page moved off the home timeline.
    NotHomePage,
    /// Every activation mechanism raised an error.
    Failed {
        /// Error text from the page.
        reason: String,
    },
}

impl ActivationOutcome {
    /// Returns `true` if the target ended up selected.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::AlreadySelected | Self::Selected)
    }
}

impl fmt::Display for ActivationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySelected => f.write_str("already selected"),
            Self::Selected => f.write_str("selected"),
            Self::NotSelected => f.write_str("not selected"),
            Self::TargetMissing => f.write_str("target missing"),
            Self::NotHomePage => f.write_str("not on home page"),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

// ============================================================================
// Attempt
// ============================================================================

/// Returns `true` if the page URL still points at a home path.
fn on_home_page(page: &dyn Page, config: &TabSelectorConfig) -> bool {
    Url::parse(&page.url())
        .map(|url| config.site.is_home_path(url.path()))
        .unwrap_or(false)
}

/// Performs one activation attempt against the current document.
///
/// The caller has already passed the navigation gate. Only the path is
/// checked again, since client-side routing can leave the home timeline
/// between attempts.
pub async fn attempt_activation(
    page: &dyn Page,
    locator: &TargetLocator,
    config: &TabSelectorConfig,
) -> ActivationOutcome {
    if !on_home_page(page, config) {
        debug!("Not on home page, skipping");
        return ActivationOutcome::NotHomePage;
    }

    if locator.is_target_selected(page).await {
        debug!("Following tab already selected");
        return ActivationOutcome::AlreadySelected;
    }

    let node = match locator.find_target_tab(page).await {
        Ok(Some(node)) => node,
        Ok(None) => {
            debug!(selector = %locator.selector(), "Following tab not found, retrying");
            return ActivationOutcome::TargetMissing;
        }
        Err(e) => {
            if e.is_recoverable() {
                debug!(error = %e, "Following tab lookup failed, retrying");
            } else {
                error!(error = %e, "Error locating Following tab");
            }
            return ActivationOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    info!(%node, "Clicking Following tab");

    let invoked = page.click(node).await;
    if let Err(e) = &invoked {
        debug!(%node, error = %e, "click() failed");
    }

    let dispatched = page.dispatch_event(node, &SyntheticEvent::click()).await;
    if let Err(e) = &dispatched {
        debug!(%node, error = %e, "Dispatched click failed");
    }

    if let (Err(click_err), Err(dispatch_err)) = (&invoked, &dispatched) {
        if click_err.is_node_error() {
            debug!(%node, error = %click_err, "Following tab detached before click");
        } else {
            error!(%node, error = %click_err, "Error clicking Following tab");
        }
        return ActivationOutcome::Failed {
            reason: format!("{}; {}", click_err, dispatch_err),
        };
    }

    sleep(config.settle_delay).await;

    if locator.is_target_selected(page).await {
        info!("Successfully selected Following tab");
        ActivationOutcome::Selected
    } else {
        warn!("Click registered but tab not selected");
        ActivationOutcome::NotSelected
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::controller::locator::primary_tabs;
    use crate::error::Error;
    use crate::page::{ActivationKind, MemoryPage, NodeSpec};

    fn config() -> TabSelectorConfig {
        TabSelectorConfig::new().with_settle_delay(Duration::from_millis(200))
    }

    fn home(url: &str, target: NodeSpec) -> MemoryPage {
        let page = MemoryPage::new(url, None);
        page.append(
            page.root(),
            NodeSpec::new("main").with_child(
                NodeSpec::new("div")
                    .with_role("tablist")
                    .with_children([NodeSpec::new("div").with_role("tab"), target]),
            ),
        )
        .expect("append");
        page
    }

    fn tab() -> NodeSpec {
        NodeSpec::new("div").with_role("tab")
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_selected_does_not_click() {
        let page = home("https://x.com/", tab().with_attribute("aria-selected", "true"));

        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;

        assert_eq!(outcome, ActivationOutcome::AlreadySelected);
        assert_eq!(page.click_count(), 0);
        assert_eq!(page.dispatch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_target() {
        let page = MemoryPage::new("https://x.com/home", None);
        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;
        assert_eq!(outcome, ActivationOutcome::TargetMissing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_selects_after_settling() {
        let page = home("https://x.com/home", tab());
        page.on_activate(|page, node, kind| {
            if *kind == ActivationKind::Invoke {
                page.set_attribute(node, "aria-selected", "true")?;
            }
            Ok(())
        });

        let started = tokio::time::Instant::now();
        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;

        assert_eq!(outcome, ActivationOutcome::Selected);
        assert_eq!(page.click_count(), 1);
        assert_eq!(page.dispatch_count(), 1);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_without_effect() {
        let page = home("https://x.com/home", tab());
        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;
        assert_eq!(outcome, ActivationOutcome::NotSelected);
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_mechanism_is_swallowed() {
        let page = home("https://x.com/home", tab());
        page.on_activate(|page, node, kind| match kind {
            ActivationKind::Invoke => Err(Error::activation(node, "click is not a function")),
            ActivationKind::Dispatch(_) => page.add_class(node, "selected"),
        });

        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;
        assert_eq!(outcome, ActivationOutcome::Selected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_mechanisms_failing() {
        let page = home("https://x.com/home", tab());
        page.on_activate(|_, node, _| Err(Error::activation(node, "detached")));

        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;
        assert!(matches!(outcome, ActivationOutcome::Failed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_target_fails_without_settling() {
        let page = home("https://x.com/home", tab());
        page.on_activate(|_, node, _| Err(Error::stale_node(node)));

        let started = tokio::time::Instant::now();
        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;

        let ActivationOutcome::Failed { reason } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(reason.contains("Stale"), "{reason}");
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_off_home_page() {
        let page = home("https://x.com/explore", tab());
        let outcome = attempt_activation(&page, &TargetLocator::new(), &config()).await;

        assert_eq!(outcome, ActivationOutcome::NotHomePage);
        assert_eq!(page.query_count(), 0);
        assert_eq!(page.nodes_matching(&primary_tabs()).len(), 2);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ActivationOutcome::TargetMissing.to_string(), "target missing");
        assert_eq!(
            ActivationOutcome::Failed {
                reason: "boom".into()
            }
            .to_string(),
            "failed: boom"
        );
    }
}
