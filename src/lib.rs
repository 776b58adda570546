//! Following Tab - selects the "Following" timeline on x.com after a fresh
//! navigation.
//!
//! When a user arrives on the home page from outside the site, the site
//! opens the algorithmic "For you" tab. This crate locates the second tab in
//! the main tab strip and activates it, retrying while the page renders.
//! It relies only on DOM structure, because no API is available to a
//! browser extension.
//!
//! # Architecture
//!
//! - **Navigation gate**: acts only on `/` or `/home`, and only when the
//!   referrer is absent, unparsable or off-site
//! - **Target locator**: `main [role="tablist"] [role="tab"]`, index 1, with
//!   selection read from an extensible list of signals
//! - **Activation attempt**: `click()` plus a dispatched click event, then
//!   a settling delay and a re-check
//! - **Scheduler**: a bounded retry timer and a mutation watcher feed one
//!   serialized state machine. A hard timeout bounds the watcher
//!
//! The document is reached through the [`Page`] trait. [`MemoryPage`] is an
//! in-memory implementation for tests and demos.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use following_tab::{MemoryPage, NodeSpec, Page, Phase, TabSelector};
//!
//! # tokio_test::block_on(async {
//! let page = Arc::new(MemoryPage::new("https://x.com/home", None));
//! page.append(
//!     page.root(),
//!     NodeSpec::new("main").with_child(
//!         NodeSpec::new("div").with_role("tablist").with_children([
//!             NodeSpec::new("div").with_role("tab").with_attribute("aria-selected", "true"),
//!             NodeSpec::new("div").with_role("tab").with_attribute("aria-selected", "false"),
//!         ]),
//!     ),
//! )?;
//! page.on_activate(|page, node, _| page.set_attribute(node, "aria-selected", "true"));
//!
//! let outcome = TabSelector::new(page.clone()).run().await;
//! assert_eq!(outcome.phase(), Some(Phase::Succeeded));
//! # Ok::<(), following_tab::Error>(())
//! # });
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`controller`] | Gate, locator, activation and scheduler |
//! | [`page`] | Document boundary and the in-memory document |
//! | [`config`] | Retry budget, timings and site profile |
//! | [`popup`] | Toolbar popup status |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Retry budget, timings and site profile.
pub mod config;

/// Tab selection controller.
///
/// - [`TabSelector`] - per-page-load entry point
/// - [`TargetLocator`] - finds the tab and reads its selection state
pub mod controller;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Document boundary.
pub mod page;

/// Toolbar popup status.
pub mod popup;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::{SiteProfile, TabSelectorConfig};

// Controller types
pub use controller::gate::{GateDecision, NavigationContext, SkipReason};
pub use controller::scheduler::{ControllerState, Phase};
pub use controller::{
    ActivationOutcome, RunOutcome, SelectionSignal, TabSelector, TargetLocator,
    attempt_activation,
};

// Page types
pub use page::{By, MemoryPage, MutationFilter, NodeSpec, Page, ReadyState, Selector};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{NodeId, PageLoadId, WatcherId};

// Popup
pub use popup::PopupStatus;
