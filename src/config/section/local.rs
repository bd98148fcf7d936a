//! `[local]` section configuration: client-scoped key/value persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::types::config_fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// JSON file holding locally persisted values (settings blob, consent).
    /// `~` is expanded; relative paths resolve against the project root.
    pub path: PathBuf,
}

config_fields!(LocalConfig => LocalFields, "local" { path });

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            path: ".masthead/local.json".into(),
        }
    }
}

impl LocalConfig {
    /// Expand `~` and anchor relative paths at `root`.
    pub fn normalize(&mut self, root: &Path) {
        let expanded = shellexpand::tilde(&self.path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        self.path = if path.is_relative() {
            root.join(path)
        } else {
            path
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_anchored_at_root() {
        let mut local = LocalConfig::default();
        local.normalize(Path::new("/srv/site"));
        assert_eq!(local.path, PathBuf::from("/srv/site/.masthead/local.json"));
    }

    #[test]
    fn test_absolute_path_kept() {
        let mut local = LocalConfig {
            path: "/var/lib/masthead.json".into(),
        };
        local.normalize(Path::new("/srv/site"));
        assert_eq!(local.path, PathBuf::from("/var/lib/masthead.json"));
    }
}
