use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::types::config_fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Output path for sitemap file
    pub path: PathBuf,
    /// Strip indentation from the generated XML
    pub minify: bool,
}

config_fields!(SitemapConfig => SitemapFields, "sitemap" { path, minify });

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            path: "sitemap.xml".into(),
            minify: false,
        }
    }
}
