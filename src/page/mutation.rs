//! Mutation observation types.
//!
//! A [`MutationWatcher`] receives batches of [`MutationRecord`]s from the
//! page, filtered by the [`MutationFilter`] it was registered with. Delivery
//! stops when the watcher is disconnected through
//! [`Page::disconnect`](super::Page::disconnect).

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::identifiers::{NodeId, WatcherId};

// ============================================================================
// Constants
// ============================================================================

/// Attributes that carry a tab's selection state.
pub const SELECTION_MARKER_ATTRIBUTES: &[&str] = &["aria-selected", "class", "data-selected"];

// ============================================================================
// MutationRecord
// ============================================================================

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    /// Children were added or removed.
    ChildList,
    /// An attribute changed.
    Attributes,
}

/// A single DOM change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    /// Kind of change.
    pub kind: MutationKind,

    /// Node whose children or attributes changed.
    pub target: NodeId,

    /// Changed attribute, for [`MutationKind::Attributes`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,

    /// Inserted children, for [`MutationKind::ChildList`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<NodeId>,

    /// Removed children, for [`MutationKind::ChildList`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<NodeId>,
}

impl MutationRecord {
    /// Creates a child-list record.
    #[must_use]
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            attribute_name: None,
            added,
            removed,
        }
    }

    /// Creates an attribute record.
    #[must_use]
    pub fn attribute(target: NodeId, name: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            attribute_name: Some(name.into()),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Records delivered together.
pub type MutationBatch = Vec<MutationRecord>;

// ============================================================================
// MutationFilter
// ============================================================================

/// Which changes a watcher wants, modelled on `MutationObserverInit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationFilter {
    /// Report child-list changes.
    pub child_list: bool,

    /// Report changes anywhere below the observed root.
    pub subtree: bool,

    /// Report attribute changes.
    pub attributes: bool,

    /// Restrict attribute changes to these names. Empty means all.
    #[serde(default)]
    pub attribute_filter: Vec<String>,
}

impl MutationFilter {
    /// Child-list changes plus changes to the selection marker attributes,
    /// anywhere in the document.
    #[must_use]
    pub fn selection_markers() -> Self {
        Self {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: SELECTION_MARKER_ATTRIBUTES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }

    /// Returns `true` if `record` should be delivered to a watcher rooted at
    /// `root`.
    #[must_use]
    pub fn accepts(&self, record: &MutationRecord, root: NodeId) -> bool {
        if !self.subtree && record.target != root {
            return false;
        }
        match record.kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attributes => {
                self.attributes
                    && (self.attribute_filter.is_empty()
                        || record
                            .attribute_name
                            .as_deref()
                            .is_some_and(|name| self.attribute_filter.iter().any(|f| f == name)))
            }
        }
    }
}

// ============================================================================
// MutationWatcher
// ============================================================================

/// Receiving end of a mutation observer registration.
#[derive(Debug)]
pub struct MutationWatcher {
    id: WatcherId,
    receiver: mpsc::UnboundedReceiver<MutationBatch>,
}

impl MutationWatcher {
    /// Wraps a registration.
    #[must_use]
    pub fn new(id: WatcherId, receiver: mpsc::UnboundedReceiver<MutationBatch>) -> Self {
        Self { id, receiver }
    }

    /// Returns the registration handle.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WatcherId {
        self.id
    }

    /// Waits for the next batch.
    ///
    /// Returns `None` once the page has dropped the registration.
    pub async fn next_batch(&mut self) -> Option<MutationBatch> {
        self.receiver.recv().await
    }
}

// ============================================================================
// Tests
// ============================================================================
