//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/content/posts/  ← cwd
/// /home/user/site/masthead.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_ancestor() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("masthead.toml"), "").unwrap();

        let found = find_config_file_from(&nested, Path::new("masthead.toml"));
        assert_eq!(found, Some(temp.path().join("masthead.toml")));
    }

    #[test]
    fn test_find_config_missing() {
        let temp = TempDir::new().unwrap();
        let found = find_config_file_from(temp.path(), Path::new("definitely-missing-name.toml"));
        assert_eq!(found, None);
    }

    #[test]
    fn test_absolute_missing_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");
        assert_eq!(find_config_file(&path), None);
    }
}
