//! Site path type.
//!
//! - Internal representation: always decoded, leading `/`, no trailing `/`
//!   except for the root
//! - Browser boundary: decode on input, encode on output

use std::sync::{Arc, OnceLock};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped inside a path segment (everything but RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Decoded site path.
///
/// Invariants:
/// - Starts with `/`
/// - No query string or fragment
/// - No empty segments, no trailing slash (root is `/`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Create from a browser path or full URL (decode, strip query and fragment).
    pub fn from_browser(encoded: &str) -> Self {
        let path = strip_query_fragment(encoded.trim());
        let decoded = percent_decode_str(&path)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| path.clone());
        Self::from_decoded(&decoded)
    }

    /// Create from an already-decoded path.
    pub fn from_decoded(decoded: &str) -> Self {
        let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Self::root();
        }
        Self(Arc::from(format!("/{}", segments.join("/"))))
    }

    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == "/"
    }

    /// Path segments, root yields none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Encode for browser (percent-encode each segment).
    pub fn to_encoded(&self) -> String {
        self.0
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Path component of `input`, accepting absolute URLs and bare paths.
fn strip_query_fragment(input: &str) -> String {
    static BASE: OnceLock<url::Url> = OnceLock::new();
    let base = BASE.get_or_init(|| url::Url::parse("http://x").unwrap());

    match base.join(input) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => input.split(['?', '#']).next().unwrap_or(input).to_string(),
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for UrlPath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for UrlPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UrlPath {
    fn from(s: &str) -> Self {
        Self::from_decoded(s)
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_browser_decodes() {
        assert_eq!(UrlPath::from_browser("/articles/caf%C3%A9"), "/articles/café");
        assert_eq!(UrlPath::from_browser("/a%20b"), "/a b");
    }

    #[test]
    fn test_from_browser_strips_query_and_fragment() {
        assert_eq!(UrlPath::from_browser("/articles?page=2#top"), "/articles");
        assert_eq!(UrlPath::from_browser("https://acme.test/about/"), "/about");
    }

    #[test]
    fn test_from_browser_invalid_utf8_kept_encoded() {
        assert_eq!(UrlPath::from_browser("/%FF"), "/%FF");
    }

    #[test]
    fn test_normalizes_slashes() {
        assert_eq!(UrlPath::from("articles//x/"), "/articles/x");
        assert_eq!(UrlPath::from(""), "/");
        assert!(UrlPath::from("///").is_root());
    }

    #[test]
    fn test_segments() {
        let path = UrlPath::from("/admin/articles/new");
        assert_eq!(path.segments().collect::<Vec<_>>(), ["admin", "articles", "new"]);
        assert_eq!(UrlPath::root().segments().count(), 0);
    }

    #[test]
    fn test_to_encoded() {
        assert_eq!(UrlPath::from("/articles/café").to_encoded(), "/articles/caf%C3%A9");
        assert_eq!(UrlPath::from("/press-releases/q3_v1.0").to_encoded(), "/press-releases/q3_v1.0");
        assert_eq!(UrlPath::from("/a b").to_encoded(), "/a%20b");
    }
}
