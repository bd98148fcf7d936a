//! Generated site files.
//!
//! - **Sitemap**: search engine indexing (`sitemap.xml`) built from the
//!   static routes plus published content rows

pub mod sitemap;

use std::borrow::Cow;

/// Strip indentation and blank lines from XML when `enabled`.
pub fn minify_xml(content: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(content);
    }
    Cow::Owned(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_xml_basic() {
        let xml = "<?xml version=\"1.0\"?>\n<root>\n  <item>Hello</item>\n</root>";
        assert_eq!(
            minify_xml(xml, true),
            "<?xml version=\"1.0\"?><root><item>Hello</item></root>"
        );
    }

    #[test]
    fn test_minify_xml_keeps_inner_spacing() {
        assert_eq!(minify_xml("  <tag>  content  </tag>  ", true), "<tag>  content  </tag>");
    }

    #[test]
    fn test_minify_xml_disabled() {
        let xml = "<root>\n\n  <item/>\n</root>";
        assert_eq!(minify_xml(xml, true), "<root><item/></root>");
        assert!(matches!(minify_xml(xml, false), Cow::Borrowed(s) if s == xml));
    }
}
