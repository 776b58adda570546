//! Navigation gate.
//!
//! Decides once per page load whether the load is a fresh arrival from
//! outside the site on the home timeline. In-app navigation is left alone,
//! since the user picked that tab on purpose.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::debug;
use url::Url;

use crate::config::SiteProfile;
use crate::error::{Error, Result};
use crate::page::Page;

// ============================================================================
// Referrer
// ============================================================================

/// Where the navigation came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Referrer {
    /// No referrer: address bar, bookmark, new tab.
    None,
    /// Referrer parsed; `host` is `None` for host-less schemes.
    Parsed {
        /// Referrer host, lower-cased.
        host: Option<String>,
    },
    /// Referrer text did not parse as a URL.
    Unparsable,
}

impl Referrer {
    /// Classifies a raw `document.referrer` value.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => Self::None,
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Self::Parsed {
                    host: url.host_str().map(str::to_ascii_lowercase),
                },
                Err(_) => Self::Unparsable,
            },
        }
    }
}

// ============================================================================
// NavigationContext
// ============================================================================

/// Navigation facts derived once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    current_path: String,
    current_host: String,
    referrer: Referrer,
}

impl NavigationContext {
    /// Builds a context from the document URL and raw referrer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `url` does not parse. A bad referrer
    /// is not an error.
    pub fn new(url: &str, referrer: Option<&str>) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::invalid_url(url, e))?;
        Ok(Self {
            current_path: parsed.path().to_string(),
            current_host: parsed.host_str().unwrap_or_default().to_ascii_lowercase(),
            referrer: Referrer::from_raw(referrer),
        })
    }

    /// Reads the URL and referrer from a page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the page URL does not parse.
    pub fn from_page(page: &dyn Page) -> Result<Self> {
        Self::new(&page.url(), page.referrer().as_deref())
    }

    /// Path of the current document.
    #[inline]
    #[must_use]
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Host of the current document.
    #[inline]
    #[must_use]
    pub fn current_host(&self) -> &str {
        &self.current_host
    }

    /// Classified referrer.
    #[inline]
    #[must_use]
    pub fn referrer(&self) -> &Referrer {
        &self.referrer
    }
}

// ============================================================================
// GateDecision
// ============================================================================

/// Why a page load is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not the home timeline.
    NotHomePath {
        /// Current path.
        path: String,
    },
    /// Arrived from inside the site.
    InternalNavigation {
        /// Referrer host.
        referrer_host: String,
    },
    /// The document URL did not parse.
    InvalidUrl {
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHomePath { path } => write!(f, "not on home page ({})", path),
            Self::InternalNavigation { referrer_host } => {
                write!(f, "not a fresh navigation (referrer {})", referrer_host)
            }
            Self::InvalidUrl { message } => write!(f, "invalid document URL: {}", message),
        }
    }
}

/// Gate verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Go ahead and select the tab.
    Proceed,
    /// Leave the page alone.
    Skip(SkipReason),
}

impl GateDecision {
    /// Returns `true` for [`GateDecision::Proceed`].
    #[inline]
    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

// ============================================================================
// Gate
// ============================================================================

/// Returns `true` if the load did not come from the site itself.
///
/// Missing and unparsable referrers count as fresh. A parsed referrer is
/// fresh when its host is neither the current host nor one of the canonical
/// hosts. Hosts must match exactly, so `mobile.twitter.com` is fresh.
#[must_use]
pub fn is_fresh_external_navigation(context: &NavigationContext, site: &SiteProfile) -> bool {
    match &context.referrer {
        Referrer::None | Referrer::Unparsable => true,
        Referrer::Parsed { host: None } => true,
        Referrer::Parsed { host: Some(host) } => {
            !host.eq_ignore_ascii_case(&context.current_host) && !site.is_canonical_host(host)
        }
    }
}

/// Runs both gate checks: home path first, then referrer.
#[must_use]
pub fn evaluate(context: &NavigationContext, site: &SiteProfile) -> GateDecision {
    if !site.is_home_path(&context.current_path) {
        debug!(path = %context.current_path, "Not on home page, skipping");
        return GateDecision::Skip(SkipReason::NotHomePath {
            path: context.current_path.clone(),
        });
    }

    if !is_fresh_external_navigation(context, site) {
        let referrer_host = match &context.referrer {
            Referrer::Parsed { host: Some(host) } => host.clone(),
            _ => String::new(),
        };
        debug!(referrer = %referrer_host, "Not a fresh navigation, skipping");
        return GateDecision::Skip(SkipReason::InternalNavigation { referrer_host });
    }

    GateDecision::Proceed
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn decide(url: &str, referrer: Option<&str>) -> GateDecision {
        let context = NavigationContext::new(url, referrer).expect("valid url");
        evaluate(&context, &SiteProfile::new())
    }

    #[test]
    fn test_no_referrer_is_fresh() {
        assert_eq!(decide("https://x.com/", None), GateDecision::Proceed);
        assert_eq!(decide("https://x.com/home", Some("")), GateDecision::Proceed);
    }

    #[test]
    fn test_external_referrer_proceeds() {
        assert_eq!(
            decide("https://x.com/home", Some("https://othersite.example/page")),
            GateDecision::Proceed
        );
    }

    #[test]
    fn test_unparsable_referrer_fails_open() {
        let context = NavigationContext::new("https://x.com/", Some("::not a url::")).expect("url");
        assert_eq!(context.referrer(), &Referrer::Unparsable);
        assert!(is_fresh_external_navigation(&context, &SiteProfile::new()));
    }

    #[test]
    fn test_hostless_referrer_is_fresh() {
        assert_eq!(decide("https://x.com/", Some("about:blank")), GateDecision::Proceed);
    }

    #[test]
    fn test_same_site_referrers_skip() {
        for referrer in [
            "https://x.com/explore",
            "https://twitter.com/someone",
            "http://X.COM/",
        ] {
            assert!(
                matches!(
                    decide("https://x.com/home", Some(referrer)),
                    GateDecision::Skip(SkipReason::InternalNavigation { .. })
                ),
                "{referrer} should skip"
            );
        }
    }

    #[test]
    fn test_site_subdomain_referrers_proceed() {
        for referrer in [
            "https://mobile.twitter.com/",
            "https://www.x.com/",
            "https://t.x.com/abc",
        ] {
            assert_eq!(
                decide("https://x.com/home", Some(referrer)),
                GateDecision::Proceed,
                "{referrer} should proceed"
            );
        }
    }

    #[test]
    fn test_current_subdomain_referrer_skips() {
        let decision = decide("https://mobile.x.com/", Some("https://mobile.x.com/explore"));
        assert!(!decision.is_proceed());
    }

    #[test]
    fn test_current_host_referrer_skips() {
        let decision = decide("https://staging.example/", Some("https://staging.example/x"));
        assert!(!decision.is_proceed());
    }

    #[test]
    fn test_other_paths_skip() {
        assert_eq!(
            decide("https://x.com/explore", None),
            GateDecision::Skip(SkipReason::NotHomePath {
                path: "/explore".to_string()
            })
        );
        assert!(!decide("https://x.com/home/", None).is_proceed());
    }

    #[test]
    fn test_query_string_does_not_affect_path() {
        assert!(decide("https://x.com/home?lang=en", None).is_proceed());
    }

    #[test]
    fn test_invalid_document_url() {
        assert!(matches!(
            NavigationContext::new("not a url", None),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::NotHomePath {
            path: "/explore".into(),
        };
        assert_eq!(reason.to_string(), "not on home page (/explore)");
    }

    proptest! {
        #[test]
        fn prop_external_hosts_proceed_on_home(
            label in "[a-z]{1,12}",
            tld in prop::sample::select(vec!["example", "org", "net", "io"]),
            path in prop::sample::select(vec!["/", "/home"]),
        ) {
            let url = format!("https://x.com{path}");
            let referrer = format!("https://{label}.{tld}/anything");
            prop_assert!(decide(&url, Some(&referrer)).is_proceed());
        }

        #[test]
        fn prop_non_home_paths_skip(segment in "[a-z]{1,12}") {
            prop_assume!(segment != "home");
            let url = format!("https://x.com/{segment}");
            prop_assert!(!decide(&url, None).is_proceed());
        }

        #[test]
        fn prop_site_subdomains_proceed(sub in "[a-z]{1,8}") {
            let referrer = format!("https://{sub}.x.com/");
            prop_assert!(decide("https://x.com/", Some(&referrer)).is_proceed());
        }

        #[test]
        fn prop_canonical_referrers_skip(
            host in prop::sample::select(vec!["x.com", "twitter.com", "X.com", "TWITTER.COM"]),
            path in "[a-z]{0,10}",
        ) {
            let referrer = format!("https://{host}/{path}");
            prop_assert!(!decide("https://x.com/home", Some(&referrer)).is_proceed());
        }
    }
}
