//! Timing and site configuration.
//!
//! The values are fixed for production use. [`TabSelectorConfig::new`] and
//! [`SiteProfile::new`] return them. The `with_*` builders exist so tests and
//! demos can shrink the timings.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use following_tab::TabSelectorConfig;
//!
//! let config = TabSelectorConfig::new()
//!     .with_max_retries(3)
//!     .with_retry_delay(Duration::from_millis(50));
//!
//! assert_eq!(config.max_retries, 3);
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Retries after the immediate attempt.
pub const MAX_RETRIES: u32 = 8;

/// Pause between timed retries.
pub const RETRY_DELAY: Duration = Duration::from_millis(600);

/// Lifetime of the mutation watcher.
pub const OBSERVER_TIMEOUT: Duration = Duration::from_millis(8000);

/// Pause after an activation before selection is re-checked.
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Pause before the first attempt when the document is already parsed.
pub const STARTUP_DELAY: Duration = Duration::from_millis(100);

/// Primary and legacy host of the site.
pub const CANONICAL_HOSTS: &[&str] = &["x.com", "twitter.com"];

/// Paths that render the home timeline.
pub const HOME_PATHS: &[&str] = &["/", "/home"];

// ============================================================================
// SiteProfile
// ============================================================================

/// Which hosts belong to the site and which paths show the home timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteProfile {
    /// Hosts of the site itself.
    pub canonical_hosts: &'static [&'static str],

    /// Paths where the tab switch applies.
    pub home_paths: &'static [&'static str],
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteProfile {
    /// Returns the profile for x.com.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            canonical_hosts: CANONICAL_HOSTS,
            home_paths: HOME_PATHS,
        }
    }

    /// Replaces the canonical hosts.
    #[inline]
    #[must_use]
    pub const fn with_canonical_hosts(mut self, hosts: &'static [&'static str]) -> Self {
        self.canonical_hosts = hosts;
        self
    }

    /// Replaces the home paths.
    #[inline]
    #[must_use]
    pub const fn with_home_paths(mut self, paths: &'static [&'static str]) -> Self {
        self.home_paths = paths;
        self
    }

    /// Returns `true` if `host` is exactly one of the canonical hosts.
    ///
    /// Comparison is ASCII case-insensitive. Sub-domains do not match.
    #[must_use]
    pub fn is_canonical_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        self.canonical_hosts
            .iter()
            .any(|canonical| host.eq_ignore_ascii_case(canonical))
    }

    /// Returns `true` if `host` is a canonical host or one of its sub-domains.
    ///
    /// Comparison is ASCII case-insensitive.
    #[must_use]
    pub fn owns_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').as_bytes();
        self.canonical_hosts.iter().any(|canonical| {
            let canonical = canonical.as_bytes();
            if host.eq_ignore_ascii_case(canonical) {
                return true;
            }
            match host.len().checked_sub(canonical.len() + 1) {
                Some(dot) => {
                    host[dot] == b'.' && host[dot + 1..].eq_ignore_ascii_case(canonical)
                }
                None => false,
            }
        })
    }

    /// Returns `true` if `path` is a home path.
    #[inline]
    #[must_use]
    pub fn is_home_path(&self, path: &str) -> bool {
        self.home_paths.contains(&path)
    }
}

// ============================================================================
// TabSelectorConfig
// ============================================================================

/// Retry budget and timings of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSelectorConfig {
    /// Timed or mutation-triggered retries after the immediate attempt.
    pub max_retries: u32,

    /// Delay between retries.
    pub retry_delay: Duration,

    /// Hard upper bound on the mutation watcher's lifetime.
    pub observer_timeout: Duration,

    /// Pause after activation before selection is re-checked.
    pub settle_delay: Duration,

    /// Pause before the first attempt when the document was already parsed.
    pub startup_delay: Duration,

    /// Site hosts and home paths.
    pub site: SiteProfile,
}

impl Default for TabSelectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TabSelectorConfig {
    /// Returns the production configuration.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            observer_timeout: OBSERVER_TIMEOUT,
            settle_delay: SETTLE_DELAY,
            startup_delay: STARTUP_DELAY,
            site: SiteProfile::new(),
        }
    }

    /// Sets the retry budget.
    #[inline]
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay between retries.
    #[inline]
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the watcher timeout.
    #[inline]
    #[must_use]
    pub const fn with_observer_timeout(mut self, timeout: Duration) -> Self {
        self.observer_timeout = timeout;
        self
    }

    /// Sets the settling delay.
    #[inline]
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the startup delay.
    #[inline]
    #[must_use]
    pub const fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Sets the site profile.
    #[inline]
    #[must_use]
    pub const fn with_site(mut self, site: SiteProfile) -> Self {
        self.site = site;
        self
    }

    /// Upper bound on activation attempts for one page load.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Checks the configuration for values that would make the scheduler spin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero retry delay, a zero observer
    /// timeout or an empty site profile.
    pub fn validate(&self) -> Result<()> {
        if self.retry_delay.is_zero() {
            return Err(Error::config("retry_delay must be non-zero"));
        }
        if self.observer_timeout.is_zero() {
            return Err(Error::config("observer_timeout must be non-zero"));
        }
        if self.site.canonical_hosts.is_empty() {
            return Err(Error::config("site profile needs at least one host"));
        }
        if self.site.home_paths.is_empty() {
            return Err(Error::config("site profile needs at least one home path"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
