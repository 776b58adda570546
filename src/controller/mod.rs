//! Tab selector controller.
//!
//! [`TabSelector`] runs once per page load:
//!
//! 1. waits for the DOM to be parsed (or a short startup delay if it already is),
//! 2. asks the navigation [`gate`] whether this load is a fresh arrival on the
//!    home timeline,
//! 3. hands over to the scheduler, which makes an immediate attempt and, if
//!    that fails, keeps retrying on a timer and on page mutations until the
//!    tab is selected or the budget runs out. The hard timeout only drops
//!    the watcher.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use following_tab::{MemoryPage, Page, TabSelector};
//!
//! # tokio_test::block_on(async {
//! let page: Arc<dyn Page> = Arc::new(MemoryPage::new("https://x.com/explore", None));
//! let outcome = TabSelector::new(page).run().await;
//! assert!(outcome.is_skipped());
//! # });
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Activation attempt.
pub mod activation;

/// Navigation gate.
pub mod gate;

/// Target locator.
pub mod locator;

/// Retry and observation scheduler.
pub mod scheduler;

/// Selection signals.
pub mod signals;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::TabSelectorConfig;
use crate::error::Result;
use crate::identifiers::PageLoadId;
use crate::page::Page;

use gate::{GateDecision, NavigationContext, SkipReason};
use scheduler::{ControllerState, Phase, Scheduler};

// ============================================================================
// Re-exports
// ============================================================================

pub use activation::{ActivationOutcome, attempt_activation};
pub use gate::{Referrer, evaluate, is_fresh_external_navigation};
pub use locator::{TARGET_TAB_INDEX, TargetLocator, primary_tabs};
pub use signals::{
    AriaSelected, ClassMarker, DataSelected, SelectedAncestor, SelectionSignal, default_signals,
};

// ============================================================================
// RunOutcome
// ============================================================================

/// How a page load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The gate left the page alone. No attempt was made.
    Skipped(SkipReason),
    /// The scheduler ran to a terminal phase.
    Finished(ControllerState),
}

impl RunOutcome {
    /// Returns `true` if the gate skipped the page.
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns `true` if the target tab ended up selected.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state().is_some_and(ControllerState::has_succeeded)
    }

    /// Terminal phase, if the scheduler ran.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.state().map(ControllerState::phase)
    }

    /// Final scheduler state, if the scheduler ran.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<&ControllerState> {
        match self {
            Self::Skipped(_) => None,
            Self::Finished(state) => Some(state),
        }
    }
}

// ============================================================================
// TabSelector
// ============================================================================

/// Selects the "Following" tab for one page load.
///
/// `run` consumes the selector, so a page load can only be driven once.
pub struct TabSelector {
    page: Arc<dyn Page>,
    config: TabSelectorConfig,
    locator: TargetLocator,
    cancel: CancellationToken,
    load_id: PageLoadId,
}

impl fmt::Debug for TabSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabSelector")
            .field("load_id", &self.load_id)
            .field("config", &self.config)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TabSelector - Constructors
// ============================================================================

impl TabSelector {
    /// Creates a selector with the production configuration.
    #[must_use]
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self {
            page,
            config: TabSelectorConfig::new(),
            locator: TargetLocator::new(),
            cancel: CancellationToken::new(),
            load_id: PageLoadId::generate(),
        }
    }

    /// Creates a selector with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// fails validation.
    pub fn with_config(page: Arc<dyn Page>, config: TabSelectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(page)
        })
    }

    /// Replaces the target locator.
    #[must_use]
    pub fn with_locator(mut self, locator: TargetLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Ties this page load to `parent`: cancelling it (page unload) stops
    /// the selector.
    #[must_use]
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }
}

// ============================================================================
// TabSelector - Accessors
// ============================================================================

impl TabSelector {
    /// ID used in this page load's log span.
    #[inline]
    #[must_use]
    pub fn load_id(&self) -> PageLoadId {
        self.load_id
    }

    /// Token cancelled when the page load reaches a terminal phase.
    ///
    /// Cancelling it from outside abandons the page load.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configuration in use.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TabSelectorConfig {
        &self.config
    }
}

// ============================================================================
// TabSelector - Run
// ============================================================================

impl TabSelector {
    /// Runs the page load to completion.
    ///
    /// Never fails: misses, page errors and give-ups are all reported
    /// through the returned [`RunOutcome`].
    pub async fn run(self) -> RunOutcome {
        let span = info_span!("following_tab", load_id = %self.load_id);
        self.run_inner().instrument(span).await
    }

    /// Spawns [`run`](Self::run) on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<RunOutcome> {
        tokio::spawn(self.run())
    }

    async fn run_inner(self) -> RunOutcome {
        info!("Tab selector initialized");

        if !self.wait_until_ready().await {
            debug!("Page load abandoned before start");
            return RunOutcome::Finished(ControllerState::abandoned());
        }

        let context = match NavigationContext::from_page(self.page.as_ref()) {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "Cannot read document URL, skipping");
                return RunOutcome::Skipped(SkipReason::InvalidUrl {
                    message: e.to_string(),
                });
            }
        };

        if let GateDecision::Skip(reason) = gate::evaluate(&context, &self.config.site) {
            return RunOutcome::Skipped(reason);
        }

        info!(path = context.current_path(), "Starting Following tab selection process");

        let state = Scheduler::new(
            self.page.as_ref(),
            &self.locator,
            &self.config,
            self.cancel.clone(),
        )
        .run()
        .await;

        RunOutcome::Finished(state)
    }

    /// Waits for DOM content, or the startup delay when already parsed.
    /// Returns `false` if cancelled first.
    async fn wait_until_ready(&self) -> bool {
        let ready = async {
            if self.page.ready_state().is_parsed() {
                sleep(self.config.startup_delay).await;
            } else {
                debug!("Waiting for DOMContentLoaded");
                if let Err(e) = self.page.dom_content_loaded().await {
                    warn!(error = %e, "Ready state unavailable, continuing");
                }
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = ready => true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
