//! Type-safe identifiers.
//!
//! Newtype wrappers keep node handles, watcher handles and page-load IDs from
//! being mixed up.
//!
//! | Type | Backing | Purpose |
//! |------|---------|---------|
//! | [`NodeId`] | `u64` | Opaque handle to an element owned by the document |
//! | [`WatcherId`] | `u64` | Registration handle for a mutation watcher |
//! | [`PageLoadId`] | UUID v4 | Correlates log lines of one page load |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Counters
// ============================================================================

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_WATCHER_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// NodeId
// ============================================================================

/// Opaque handle to an element in the live document.
///
/// The document owns the element. A handle may go stale at any moment, so
/// callers re-acquire it on every check instead of holding on to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wraps a raw handle value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocates a process-unique handle.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

// ============================================================================
// WatcherId
// ============================================================================

/// Registration handle for a mutation watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(u64);

impl WatcherId {
    /// Allocates a process-unique handle.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WATCHER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watcher-{}", self.0)
    }
}

// ============================================================================
// PageLoadId
// ============================================================================

/// Identifies a single page load in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageLoadId(Uuid);

impl PageLoadId {
    /// Generates a fresh random ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PageLoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// Tests
// ============================================================================
