//! Element locator predicates.
//!
//! A [`Selector`] is a descendant chain of [`By`] predicates. It covers the
//! small CSS subset the tab locator needs and renders back to CSS text for
//! logs and for backends that query with `querySelectorAll`.
//!
//! # Example
//!
//! ```
//! use following_tab::page::{By, Selector};
//!
//! let tabs = Selector::new(By::tag("main"))
//!     .descendant(By::role("tablist"))
//!     .descendant(By::role("tab"));
//!
//! assert_eq!(tabs.to_css(), r#"main [role="tablist"] [role="tab"]"#);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ElementView
// ============================================================================

/// Read-only view of one element, enough to evaluate a [`By`] predicate.
pub trait ElementView {
    /// Lower-case tag name.
    fn tag_name(&self) -> &str;

    /// Attribute value, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Returns `true` if the `class` attribute lists `class`.
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

// ============================================================================
// By Enum
// ============================================================================

/// Single-element predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value")]
pub enum By {
    /// Tag name, compared case-insensitively.
    #[serde(rename = "tag")]
    Tag(String),

    /// ARIA `role` attribute.
    #[serde(rename = "role")]
    Role(String),

    /// Single class name.
    #[serde(rename = "class")]
    Class(String),

    /// Attribute presence, or exact value when `value` is set.
    #[serde(rename = "attribute")]
    Attribute {
        /// Attribute name.
        name: String,
        /// Required value.
        value: Option<String>,
    },
}

impl By {
    /// Creates a tag name predicate.
    #[inline]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Creates a role predicate.
    #[inline]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role(role.into())
    }

    /// Creates a class predicate.
    #[inline]
    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    /// Creates an attribute presence predicate.
    #[inline]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: None,
        }
    }

    /// Creates an attribute value predicate.
    #[inline]
    pub fn attribute_eq(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Tag(_) => "tag",
            Self::Role(_) => "role",
            Self::Class(_) => "class",
            Self::Attribute { .. } => "attribute",
        }
    }

    /// Evaluates the predicate against an element.
    #[must_use]
    pub fn matches<E: ElementView + ?Sized>(&self, element: &E) -> bool {
        match self {
            Self::Tag(tag) => element.tag_name().eq_ignore_ascii_case(tag),
            Self::Role(role) => element.attribute("role") == Some(role.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute { name, value } => match (element.attribute(name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }

    /// Renders the predicate as a CSS compound selector.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Tag(tag) => tag.to_ascii_lowercase(),
            Self::Role(role) => format!("[role=\"{}\"]", role),
            Self::Class(class) => format!(".{}", class),
            Self::Attribute { name, value: None } => format!("[{}]", name),
            Self::Attribute {
                name,
                value: Some(value),
            } => format!("[{}=\"{}\"]", name, value),
        }
    }
}

// ============================================================================
// Selector
// ============================================================================

/// Descendant chain of predicates, read left to right like CSS.
///
/// An element matches when it satisfies the last step and has ancestors
/// satisfying the earlier steps in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    steps: Vec<By>,
}

impl Selector {
    /// Creates a single-step selector.
    #[inline]
    #[must_use]
    pub fn new(by: By) -> Self {
        Self { steps: vec![by] }
    }

    /// Appends a descendant step.
    #[inline]
    #[must_use]
    pub fn descendant(mut self, by: By) -> Self {
        self.steps.push(by);
        self
    }

    /// Returns the steps in order.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[By] {
        &self.steps
    }

    /// Renders the selector as CSS text.
    #[must_use]
    pub fn to_css(&self) -> String {
        self.steps
            .iter()
            .map(By::to_css)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<By> for Selector {
    fn from(by: By) -> Self {
        Self::new(by)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

// ============================================================================
// Tests
// ============================================================================
