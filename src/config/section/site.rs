//! `[site]` section configuration.
//!
//! Static facts about the public site that the database does not own:
//! origin, default description, locale and social profiles. Display values
//! that editors change at runtime (title, company name, logo) live in the
//! effective settings instead.

use crate::config::ConfigDiagnostics;
use crate::config::types::config_fields;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Public origin (e.g., "https://example.com"). Canonical URLs and
    /// absolute asset URLs are built from it.
    pub url: Option<String>,

    /// Description used when a page supplies none.
    pub description: Option<String>,

    /// OpenGraph locale (e.g., "en_US").
    pub locale: String,

    /// Fallback logo when settings carry no `siteLogo`.
    pub logo: Option<String>,

    /// Twitter handle for `twitter:site` (e.g., "@masthead").
    pub twitter: Option<String>,

    /// Social profile URLs for the Organization `sameAs` list.
    pub same_as: Vec<String>,

    /// Alternate organization names.
    pub alternate_names: Vec<String>,

    /// Search page URL for the WebSite `SearchAction`
    /// (e.g., "https://example.com/search?q=").
    pub search_url: Option<String>,

    /// Default share image for pages without their own.
    pub default_image: Option<String>,
}

config_fields!(SiteSectionConfig => SiteSectionFields, "site" {
    url,
    description,
    locale,
    logo,
    twitter,
    same_as,
    alternate_names,
    search_url,
    default_image,
});

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            description: None,
            locale: "en_US".into(),
            logo: None,
            twitter: None,
            same_as: Vec::new(),
            alternate_names: Vec::new(),
            search_url: None,
            default_image: None,
        }
    }
}

impl SiteSectionConfig {
    /// Site origin without trailing slash, if configured.
    pub fn origin(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Validate site configuration.
    ///
    /// # Checks
    /// - `url` must be a valid http(s) URL with a host
    /// - `same_as` entries must be absolute http(s) URLs
    /// - `twitter` should start with `@`
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url_str) = &self.url {
            validate_http_url(url_str, Self::FIELDS.url, diag);
        }

        for profile in &self.same_as {
            if url::Url::parse(profile).is_err() {
                diag.error_with_hint(
                    Self::FIELDS.same_as,
                    format!("invalid profile URL '{profile}'"),
                    "use absolute URLs like https://www.linkedin.com/company/example",
                );
            }
        }

        if let Some(handle) = &self.twitter
            && !handle.starts_with('@')
        {
            diag.warn(
                Self::FIELDS.twitter,
                format!("handle '{handle}' has no leading '@'"),
            );
        }
    }
}

/// Check that a URL parses, uses http or https, and has a host.
pub(crate) fn validate_http_url(
    url_str: &str,
    field: crate::config::FieldPath,
    diag: &mut ConfigDiagnostics,
) {
    match url::Url::parse(url_str) {
        Ok(parsed) => {
            if !matches!(parsed.scheme(), "http" | "https") {
                diag.error_with_hint(
                    field,
                    format!(
                        "scheme '{}' not supported, must be http or https",
                        parsed.scheme()
                    ),
                    "use format like https://example.com",
                );
            }
            if parsed.host_str().is_none() {
                diag.error_with_hint(
                    field,
                    "URL must have a valid host",
                    "use format like https://example.com",
                );
            }
        }
        Err(e) => {
            diag.error_with_hint(
                field,
                format!("invalid URL: {}", e),
                "use format like https://example.com",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.locale, "en_US");
        assert!(config.site.url.is_none());
        assert!(config.site.same_as.is_empty());
    }

    #[test]
    fn test_origin_trims_trailing_slash() {
        let config = test_parse_config("[site]\nurl = \"https://example.com/\"");
        assert_eq!(config.site.origin(), Some("https://example.com"));
    }

    #[test]
    fn test_invalid_url_reported() {
        let config = test_parse_config("[site]\nurl = \"ftp://example.com\"");
        let mut diag = ConfigDiagnostics::new();
        config.site.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(
            diag.errors().next().map(|d| d.field),
            Some(SiteSectionConfig::FIELDS.url)
        );
    }

    #[test]
    fn test_twitter_without_at_is_warning() {
        let config = test_parse_config("[site]\ntwitter = \"masthead\"");
        let mut diag = ConfigDiagnostics::new();
        config.site.validate(&mut diag);
        assert!(diag.is_empty());
        assert_eq!(diag.warnings().count(), 1);
    }
}
