//! `[storage]` section configuration.

use crate::config::ConfigDiagnostics;
use crate::config::types::config_fields;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Domain of the hosting provider. Asset URLs on any
    /// `https://<project>.<provider_domain>/storage/...` host are rewritten
    /// to the configured backend.
    pub provider_domain: String,

    /// Default bucket for uploads.
    pub bucket: String,
}

config_fields!(StorageConfig => StorageFields, "storage" { provider_domain, bucket });

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider_domain: "supabase.co".into(),
            bucket: "media".into(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.provider_domain.is_empty() || self.provider_domain.contains("://") {
            diag.error_with_hint(
                Self::FIELDS.provider_domain,
                format!("'{}' is not a bare domain", self.provider_domain),
                "use a domain without scheme, e.g.: \"supabase.co\"",
            );
        }
        if self.bucket.is_empty() || self.bucket.contains('/') {
            diag.error(
                Self::FIELDS.bucket,
                "bucket must be a single non-empty path segment",
            );
        }
    }
}
