//! Type-safe config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// A type-safe wrapper for config field paths.
///
/// Section structs declare their paths with `config_fields!`, which
/// generates a `FIELDS` constant:
///
/// ```ignore
/// config_fields!(SiteSectionConfig => SiteSectionFields, "site" { url, locale });
///
/// // Usage:
/// diag.error(SiteSectionConfig::FIELDS.url, "required");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Generate a `FIELDS` constant holding one `FieldPath` per listed field,
/// each prefixed with the section's TOML path.
macro_rules! config_fields {
    ($ty:ident => $fields:ident, $section:literal { $($field:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $fields {
            $(pub $field: $crate::config::FieldPath,)*
        }

        impl $ty {
            pub const FIELDS: $fields = $fields {
                $($field: $crate::config::FieldPath::new(
                    concat!($section, ".", stringify!($field))
                ),)*
            };
        }
    };
}

pub(crate) use config_fields;

#[cfg(test)]
mod tests {
    struct Sample;
    config_fields!(Sample => SampleFields, "site" { url, locale });

    #[test]
    fn test_generated_paths() {
        assert_eq!(Sample::FIELDS.url.as_str(), "site.url");
        assert_eq!(Sample::FIELDS.locale.as_str(), "site.locale");
    }
}
