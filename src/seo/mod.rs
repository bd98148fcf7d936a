//! SEO metadata and structured data.
//!
//! # Module Structure
//!
//! ```text
//! seo/
//! ├── schema.rs  # schema.org JSON-LD builders
//! ├── meta.rs    # canonical URL, description, title, robots, absolute URLs
//! ├── og.rs      # Open Graph / Twitter Card tags
//! ├── head.rs    # PageHead assembly and rendering
//! └── page.rs    # Per-view heads (home, article, profile, issue, ...)
//! ```
//!
//! Everything here is pure: inputs in, strings and JSON out.

pub mod head;
pub mod meta;
pub mod og;
pub mod page;
pub mod schema;

pub use head::{PageHead, PageSeo};
pub use og::{MetaAttr, MetaTag, OgTags, OgType};

use serde_json::Value;

use crate::config::SiteConfig;
use crate::settings::EffectiveSettings;
use schema::{OrganizationSchema, Publisher, WebsiteSchema};

/// Site-wide facts every page head draws on, merged from config and the
/// effective settings.
#[derive(Debug, Clone)]
pub struct SeoContext {
    pub site_name: String,
    pub company_name: String,
    /// Public origin without trailing slash.
    pub origin: Option<String>,
    /// Fallback description.
    pub description: String,
    pub locale: String,
    pub twitter: Option<String>,
    /// Absolute logo URL.
    pub logo: Option<String>,
    /// Absolute share image for pages without their own.
    pub default_image: Option<String>,
    pub same_as: Vec<String>,
    pub alternate_names: Vec<String>,
    pub search_url: Option<String>,
}

impl SeoContext {
    pub fn new(config: &SiteConfig, settings: &EffectiveSettings) -> Self {
        let site = &config.site;
        let origin = site.origin().map(str::to_string);
        let abs = |url: &String| meta::absolute_url(url, origin.as_deref());

        Self {
            site_name: settings.site_title.clone(),
            company_name: settings.company_name.clone(),
            description: site
                .description
                .clone()
                .unwrap_or_else(|| meta::DEFAULT_DESCRIPTION.to_string()),
            locale: site.locale.clone(),
            twitter: site.twitter.clone(),
            logo: settings.site_logo.as_ref().or(site.logo.as_ref()).map(abs),
            default_image: site.default_image.as_ref().map(abs),
            same_as: site.same_as.clone(),
            alternate_names: site.alternate_names.clone(),
            search_url: site.search_url.clone(),
            origin,
        }
    }

    /// Canonical URL of a site path.
    pub fn url(&self, path: &str) -> Option<String> {
        meta::canonical_url(None, self.origin.as_deref(), path)
    }

    /// Resolve an asset or link against the origin.
    pub fn absolute(&self, url: &str) -> String {
        meta::absolute_url(url, self.origin.as_deref())
    }

    pub fn publisher(&self) -> Publisher<'_> {
        Publisher {
            name: &self.company_name,
            logo: self.logo.as_deref(),
        }
    }

    /// Organization schema; needs an origin for its `url`.
    pub fn organization(&self) -> Option<Value> {
        let url = self.url("/")?;
        Some(schema::organization(&OrganizationSchema {
            name: &self.company_name,
            url: &url,
            logo: self.logo.as_deref(),
            alternate_names: &self.alternate_names,
            same_as: &self.same_as,
        }))
    }

    /// WebSite schema; needs an origin for its `url`.
    pub fn website(&self) -> Option<Value> {
        let url = self.url("/")?;
        let alternate = (self.company_name != self.site_name).then_some(self.company_name.as_str());
        Some(schema::website(&WebsiteSchema {
            name: &self.site_name,
            url: &url,
            alternate_name: alternate,
            search_url: self.search_url.as_deref(),
        }))
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            site_name: "Acme".into(),
            company_name: "Acme Media".into(),
            origin: Some("https://acme.test".into()),
            description: "Acme stories.".into(),
            locale: "en_US".into(),
            twitter: Some("@acme".into()),
            logo: Some("https://acme.test/logo.png".into()),
            default_image: Some("https://acme.test/share.png".into()),
            same_as: Vec::new(),
            alternate_names: Vec::new(),
            search_url: None,
        }
    }
}
