//! Object storage URLs and uploads.
//!
//! Asset URLs stored in content rows may point at a previous backend
//! project (`https://<old>.supabase.co/storage/v1/object/public/...`).
//! `StorageUrls` rewrites them onto the configured backend so that every URL
//! handed to rendering carries the current host.
//!
//! ```text
//! https://old-ref.supabase.co/storage/v1/object/public/media/a.png
//!                     │                                  └── object path
//!                     ▼
//! https://new-ref.supabase.co/storage/v1/object/public/media/a.png
//! ```

mod object;

pub use object::{MemoryObjectStore, ObjectStore, unique_object_name};
pub(crate) use object::object_path;

use regex::Regex;

use crate::config::SiteConfig;

/// Path segment between backend origin and `{bucket}/{path}` for public objects.
pub const PUBLIC_OBJECT_PATH: &str = "/storage/v1/object/public/";

/// Rewrites and builds public object URLs for the configured backend.
#[derive(Debug, Clone)]
pub struct StorageUrls {
    /// `{backendOrigin}/storage/v1/object/public/`, absent without a backend.
    prefix: Option<String>,
    /// Matches public object URLs on any project of the provider domain.
    legacy: Option<Regex>,
}

impl StorageUrls {
    pub fn new(backend_origin: Option<&str>, provider_domain: &str) -> Self {
        let prefix = backend_origin
            .map(|origin| origin.trim_end_matches('/'))
            .filter(|origin| !origin.is_empty())
            .map(|origin| format!("{origin}{PUBLIC_OBJECT_PATH}"));

        let pattern = format!(
            r"^https://[A-Za-z0-9-]+\.{}/storage/v1/object/public/(.+)$",
            regex::escape(provider_domain)
        );

        Self {
            prefix,
            legacy: Regex::new(&pattern).ok(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.backend.origin(), &config.storage.provider_domain)
    }

    /// Current public prefix, if a backend is configured.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Rewrite a stored asset URL onto the current backend host.
    ///
    /// - absent input -> absent
    /// - no backend configured -> input unchanged
    /// - public object URL on any provider project -> `{prefix}{objectPath}`
    /// - anything else (current host, `/placeholder.svg`, CDN) -> unchanged
    pub fn normalize(&self, url: Option<&str>) -> Option<String> {
        let url = url?;
        let Some(prefix) = &self.prefix else {
            return Some(url.to_string());
        };

        let object_path = self
            .legacy
            .as_ref()
            .and_then(|re| re.captures(url))
            .and_then(|caps| caps.get(1));

        match object_path {
            Some(path) => Some(format!("{prefix}{}", path.as_str())),
            None => Some(url.to_string()),
        }
    }

    /// Normalize an optional URL field of a decoded row.
    #[inline]
    pub fn normalize_field(&self, field: &mut Option<String>) {
        if field.is_some() {
            *field = self.normalize(field.as_deref());
        }
    }

    /// Build a public URL for an object: `{prefix}{bucket}/{path}`.
    ///
    /// Leading slashes of `path` are dropped. Empty without a backend.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{bucket}/{}", path.trim_start_matches('/')),
            None => String::new(),
        }
    }
}
