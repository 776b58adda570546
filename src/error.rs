//! Error types for the tab selector.
//!
//! Every fallible operation on the document boundary returns [`Result<T>`].
//! The controller itself never surfaces these to its caller: a failed query
//! or activation is an expected, retryable miss and is folded into an
//! outcome value instead.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Navigation | [`Error::InvalidUrl`] |
//! | Node | [`Error::NodeNotFound`], [`Error::StaleNode`] |
//! | Activation | [`Error::Activation`] |
//! | Observation | [`Error::Observer`], [`Error::ChannelClosed`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::NodeId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a configuration value is out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// URL could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The raw URL text.
        url: String,
        /// Parser message.
        message: String,
    },

    // ========================================================================
    // Node Errors
    // ========================================================================
    /// Node handle does not resolve to any node.
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// The missing node's ID.
        node_id: NodeId,
    },

    /// Node was detached from the document.
    ///
    /// Returned when a handle outlives the element it referred to.
    #[error("Stale node: {node_id}")]
    StaleNode {
        /// The stale node's ID.
        node_id: NodeId,
    },

    // ========================================================================
    // Activation Errors
    // ========================================================================
    /// Simulated activation raised an error inside the page.
    #[error("Activation failed on {node_id}: {message}")]
    Activation {
        /// Target node.
        node_id: NodeId,
        /// Error message reported by the page.
        message: String,
    },

    // ========================================================================
    // Observation Errors
    // ========================================================================
    /// Mutation observer could not be attached.
    #[error("Observer error: {message}")]
    Observer {
        /// Description of the failure.
        message: String,
    },

    /// Delivery channel closed.
    #[error("Channel closed")]
    ChannelClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, err: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: err.to_string(),
        }
    }

    /// Creates a node not found error.
    #[inline]
    pub fn node_not_found(node_id: NodeId) -> Self {
        Self::NodeNotFound { node_id }
    }

    /// Creates a stale node error.
    #[inline]
    pub fn stale_node(node_id: NodeId) -> Self {
        Self::StaleNode { node_id }
    }

    /// Creates an activation error.
    #[inline]
    pub fn activation(node_id: NodeId, message: impl Into<String>) -> Self {
        Self::Activation {
            node_id,
            message: message.into(),
        }
    }

    /// Creates an observer error.
    #[inline]
    pub fn observer(message: impl Into<String>) -> Self {
        Self::Observer {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a node error.
    #[inline]
    #[must_use]
    pub fn is_node_error(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. } | Self::StaleNode { .. })
    }

    /// Returns `true` if this error may clear up on a later attempt.
    ///
    /// The page keeps rendering after load, so missing or detached nodes and
    /// activation failures are all worth another try.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::StaleNode { .. } | Self::Activation { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
