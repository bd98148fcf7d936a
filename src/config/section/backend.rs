//! `[backend]` section configuration.
//!
//! Where the hosted data service lives and how to authenticate against it.
//!
//! ```toml
//! [backend]
//! url = "https://abcd1234.supabase.co"
//! anon_key = "eyJ..."          # or set MASTHEAD_BACKEND_KEY
//! ```

use crate::config::ConfigDiagnostics;
use crate::config::section::site::validate_http_url;
use crate::config::types::config_fields;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `backend.anon_key`.
pub const BACKEND_KEY_ENV: &str = "MASTHEAD_BACKEND_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend origin. Storage public URLs are derived from it.
    pub url: Option<String>,

    /// Public API key sent as `apikey` and bearer token.
    pub anon_key: Option<String>,
}

config_fields!(BackendConfig => BackendFields, "backend" { url, anon_key });

impl BackendConfig {
    /// Backend origin without trailing slash, if configured.
    pub fn origin(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// API key, preferring the environment over the config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(BACKEND_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.anon_key.clone())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url) = &self.url {
            validate_http_url(url, Self::FIELDS.url, diag);
            if self.api_key().is_none() {
                diag.warn_with_hint(
                    Self::FIELDS.anon_key,
                    "no API key configured, backend requests will fail",
                    format!("set anon_key or export {BACKEND_KEY_ENV}"),
                );
            }
        }
    }
}
