//! Config loading errors and the validation report.

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("masthead.toml is not valid TOML")]
    Toml(#[from] toml::de::Error),

    // Rendered in full by Display; no source to avoid printing it twice.
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

// ============================================================================
// diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// One finding about a config field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} {}", self.field.as_str().cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({} {hint})", "try:".yellow())?;
        }
        Ok(())
    }
}

/// Findings of a validation pass. Errors abort loading, warnings are
/// logged and loading continues.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    items: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, field: FieldPath, message: String, hint: Option<String>) {
        self.items.push(ConfigDiagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    pub fn warn_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Warning, field, message.into(), Some(hint.into()));
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.errors().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_errors()
    }

    /// Log warnings on the `config` channel.
    pub fn log_warnings(&self) {
        for warning in self.warnings() {
            crate::log!("config"; "{}", warning.to_string().trim_start());
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.len();
        let noun = if count == 1 { "problem" } else { "problems" };
        write!(f, "{} ({count} {noun})", "invalid masthead.toml".red().bold())?;
        for error in self.errors() {
            write!(f, "\n{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: FieldPath = FieldPath::new("site.url");
    const KEY: FieldPath = FieldPath::new("backend.anon_key");

    #[test]
    fn test_errors_and_warnings_are_separate() {
        let mut diag = ConfigDiagnostics::new();
        assert!(diag.is_empty());

        diag.warn_with_hint(KEY, "no API key", "set MASTHEAD_BACKEND_KEY");
        assert!(!diag.has_errors());
        assert_eq!(diag.len(), 0);
        assert_eq!(diag.warnings().count(), 1);

        diag.error(URL, "invalid URL");
        assert!(diag.has_errors());
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors().next().map(|d| d.field), Some(URL));
    }

    #[test]
    fn test_report_lists_only_errors() {
        owo_colors::set_override(false);
        let mut diag = ConfigDiagnostics::new();
        diag.error_with_hint(URL, "invalid URL", "use https://example.com");
        diag.error(FieldPath::new("storage.bucket"), "empty bucket");
        diag.warn(FieldPath::new("site.twitter"), "no leading '@'");

        let text = diag.to_string();
        assert!(text.starts_with("invalid masthead.toml (2 problems)"));
        assert!(text.contains("site.url invalid URL (try: use https://example.com)"));
        assert!(text.contains("storage.bucket empty bucket"));
        assert!(!text.contains("twitter"));
    }

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(
            PathBuf::from("masthead.toml"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "cannot read `masthead.toml`");
    }
}
