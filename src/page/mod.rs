//! Document boundary.
//!
//! The controller only reads page structure and issues simulated activation
//! through the [`Page`] trait. It never edits page content directly.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Page`] | Async view of one loaded document |
//! | [`Selector`], [`By`] | Element predicates |
//! | [`MutationWatcher`] | Receiving end of a mutation observer |
//! | [`MemoryPage`] | In-memory document for tests and demos |

// ============================================================================
// Submodules
// ============================================================================

/// In-memory document.
pub mod memory;

/// Mutation observation types.
pub mod mutation;

/// Element predicates.
pub mod selector;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identifiers::{NodeId, WatcherId};

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{ActivationHandler, ActivationKind, MemoryPage, NodeSpec};
pub use mutation::{
    MutationBatch, MutationFilter, MutationKind, MutationRecord, MutationWatcher,
    SELECTION_MARKER_ATTRIBUTES,
};
pub use selector::{By, ElementView, Selector};

// ============================================================================
// ReadyState
// ============================================================================

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// Still parsing.
    Loading,
    /// Parsed, sub-resources pending.
    Interactive,
    /// Fully loaded.
    Complete,
}

impl ReadyState {
    /// Returns `true` once the DOM content has been parsed.
    #[inline]
    #[must_use]
    pub fn is_parsed(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

// ============================================================================
// SyntheticEvent
// ============================================================================

/// Event dispatched at an element, modelled on `MouseEventInit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    /// Event type, for example `click`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Bubbles up the tree.
    pub bubbles: bool,

    /// Can be cancelled by a handler.
    pub cancelable: bool,
}

impl SyntheticEvent {
    /// A bubbling, cancelable `click`.
    #[must_use]
    pub fn click() -> Self {
        Self {
            event_type: "click".to_string(),
            bubbles: true,
            cancelable: true,
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// One loaded document, as seen from an extension content script.
///
/// Node handles returned by queries belong to the document and may go stale
/// between calls. Methods taking a stale handle fail with
/// [`Error::StaleNode`](crate::Error::StaleNode).
#[async_trait]
pub trait Page: Send + Sync {
    /// Full URL of the document.
    fn url(&self) -> String;

    /// `document.referrer`, with the empty string mapped to `None`.
    fn referrer(&self) -> Option<String>;

    /// Current ready state.
    fn ready_state(&self) -> ReadyState;

    /// Resolves once the DOM content has been parsed.
    async fn dom_content_loaded(&self) -> Result<()>;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &Selector) -> Result<Vec<NodeId>>;

    /// Attribute value of `node`.
    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>>;

    /// Returns `true` if `node`'s class list contains `class`.
    async fn has_class(&self, node: NodeId, class: &str) -> Result<bool>;

    /// `node` itself or its nearest ancestor matching `selector`.
    async fn closest(&self, node: NodeId, selector: &Selector) -> Result<Option<NodeId>>;

    /// Invokes the element's activation behaviour (`element.click()`).
    async fn click(&self, node: NodeId) -> Result<()>;

    /// Dispatches a synthetic event at `node`.
    async fn dispatch_event(&self, node: NodeId, event: &SyntheticEvent) -> Result<()>;

    /// Attaches a mutation watcher to the document body.
    fn observe(&self, filter: &MutationFilter) -> Result<MutationWatcher>;

    /// Detaches a watcher. Unknown handles are ignored.
    fn disconnect(&self, watcher: WatcherId);
}

// ============================================================================
// Tests
// ============================================================================
