//! Toolbar popup status.
//!
//! The popup only looks at the active browser tab's URL and shows one of five
//! fixed messages. Classification is a pure function so the popup script can
//! stay a thin renderer.

use url::Url;

use crate::config::SiteProfile;

/// What the popup shows for the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupStatus {
    /// On the site's home timeline.
    Active,
    /// On the site, but not the home timeline.
    WrongPage,
    /// Some other site.
    WrongSite,
    /// No active tab was found.
    NoTab,
    /// The tab's URL mentions the site but did not parse.
    Error,
}

impl PopupStatus {
    /// Classifies the active tab's URL against the default site profile.
    #[must_use]
    pub fn for_tab_url(url: Option<&str>) -> Self {
        Self::for_tab_url_on(url, &SiteProfile::new())
    }

    /// Classifies the active tab's URL against `site`.
    ///
    /// `None` means there is no active tab. A tab without a URL is treated
    /// as another site.
    #[must_use]
    pub fn for_tab_url_on(url: Option<&str>, site: &SiteProfile) -> Self {
        let Some(url) = url else {
            return Self::NoTab;
        };
        let Ok(parsed) = Url::parse(url) else {
            let mentions_site = site.canonical_hosts.iter().any(|host| url.contains(host));
            return if mentions_site { Self::Error } else { Self::WrongSite };
        };

        match parsed.host_str() {
            Some(host) if site.owns_host(host) => {
                if site.is_home_path(parsed.path()) {
                    Self::Active
                } else {
                    Self::WrongPage
                }
            }
            _ => Self::WrongSite,
        }
    }

    /// CSS class of the status element.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Active => "status active",
            Self::WrongPage | Self::WrongSite | Self::NoTab | Self::Error => "status inactive",
        }
    }

    /// Status text.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Active => "✓ Extension is active on this page",
            Self::WrongPage => "⚠ Extension only works on X.com home page",
            Self::WrongSite => "⚠ Extension only works on X.com",
            Self::NoTab => "⚠ Unable to detect current tab",
            Self::Error => "⚠ Error checking current page",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
