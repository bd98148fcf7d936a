//! Sitemap generation.
//!
//! Lists the static public views plus every published article, category,
//! magazine issue, leadership profile and press release.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::config::SiteConfig;
use crate::content::{
    Article, Backend, Category, ContentError, ContentService, LeadershipProfile, Magazine,
    PressRelease, Query,
};
use crate::core::{Route, UrlPath};
use crate::generator::minify_xml;
use crate::log;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Collect entries from `content` and write `config.sitemap.path`.
pub async fn build_sitemap<B: Backend>(
    config: &SiteConfig,
    content: &ContentService<B>,
) -> Result<PathBuf> {
    let Some(origin) = config.site.origin() else {
        bail!("[site].url is required to build a sitemap");
    };

    let sitemap = Sitemap::collect(content, origin)
        .await
        .context("failed to load content for sitemap")?;
    let path = config.sitemap.path.clone();
    sitemap.write(&path, config.sitemap.minify)?;
    Ok(path)
}

#[derive(Debug, Default)]
pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

impl Sitemap {
    pub async fn collect<B: Backend>(
        content: &ContentService<B>,
        origin: &str,
    ) -> Result<Self, ContentError> {
        let mut sitemap = Self::default();
        for route in &Route::STATIC {
            sitemap.push(origin, route, None);
        }

        let published = || Query::new().not_null("published_at");

        for article in content.list::<Article>(published()).await? {
            let lastmod = article.last_modified().map(str::to_string);
            sitemap.push(origin, &Route::Article { slug: article.slug }, lastmod.as_deref());
        }
        for category in content.list_all::<Category>().await? {
            sitemap.push(origin, &Route::Category { slug: category.slug }, None);
        }
        for magazine in content.list_all::<Magazine>().await? {
            let lastmod = magazine.publish_date.or(magazine.created_at);
            sitemap.push(origin, &Route::Magazine { slug: magazine.slug }, lastmod.as_deref());
        }
        for profile in content.list_all::<LeadershipProfile>().await? {
            sitemap.push(origin, &Route::Profile { slug: profile.slug }, None);
        }
        for release in content.list::<PressRelease>(published()).await? {
            let lastmod = release.published_at.or(release.created_at);
            sitemap.push(origin, &Route::PressRelease { slug: release.slug }, lastmod.as_deref());
        }

        crate::debug!("sitemap"; "{} urls", sitemap.urls.len());
        Ok(sitemap)
    }

    /// Detail views without a slug have no address and are skipped.
    fn push(&mut self, origin: &str, route: &Route, lastmod: Option<&str>) {
        if route.slug().is_some_and(|slug| slug.trim().is_empty()) {
            return;
        }
        let path = UrlPath::from(route.path().as_str()).to_encoded();
        self.urls.push(UrlEntry {
            loc: format!("{}{path}", origin.trim_end_matches('/')),
            lastmod: lastmod.and_then(lastmod_date),
        });
    }

    pub fn urls(&self) -> &[UrlEntry] {
        &self.urls
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&escape_xml(&lastmod));
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(self, path: &std::path::Path, minify: bool) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let count = self.urls.len();
        let xml = self.into_xml();
        let xml = minify_xml(&xml, minify);
        fs::write(path, xml.as_bytes())
            .with_context(|| format!("failed to write sitemap to {}", path.display()))?;

        log!("sitemap"; "{} ({count} urls)", path.display());
        Ok(())
    }
}

/// `YYYY-MM-DD` part of a stored timestamp. Anything not starting with a
/// date is dropped.
fn lastmod_date(timestamp: &str) -> Option<String> {
    let date = timestamp.trim().get(..10)?;
    let bytes = date.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    well_formed.then(|| date.to_string())
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Collection, MemoryBackend};
    use crate::storage::StorageUrls;
    use serde_json::json;
    use tempfile::TempDir;

    fn service() -> ContentService<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.seed(
            Collection::Articles,
            vec![
                json!({"id": 1, "title": "Big News", "slug": "big-news",
                       "published_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-03T08:00:00Z"}),
                json!({"id": 2, "title": "Draft", "slug": "draft", "published_at": null}),
            ],
        );
        backend.seed(
            Collection::Magazines,
            vec![json!({"id": 7, "title": "Spring", "slug": "spring-2024", "publish_date": "2024-03-01"})],
        );
        backend.seed(
            Collection::LeadershipProfiles,
            vec![
                json!({"id": 3, "name": "Jane Doe", "slug": "jane-doe"}),
                json!({"id": 4, "name": "No Slug", "slug": ""}),
            ],
        );
        ContentService::new(backend, StorageUrls::new(None, "supabase.co"))
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("it's <x>"), "it&apos;s &lt;x&gt;");
    }

    #[test]
    fn test_lastmod_date() {
        assert_eq!(lastmod_date("2024-05-01T10:00:00Z").as_deref(), Some("2024-05-01"));
        assert_eq!(lastmod_date("2024-05-01").as_deref(), Some("2024-05-01"));
        assert_eq!(lastmod_date("May 1st 2024"), None);
        assert_eq!(lastmod_date("2024"), None);
    }

    #[tokio::test]
    async fn test_collect_published_content() {
        let sitemap = Sitemap::collect(&service(), "https://acme.test/").await.unwrap();
        let locs: Vec<&str> = sitemap.urls().iter().map(|u| u.loc.as_str()).collect();

        assert_eq!(locs[0], "https://acme.test/");
        assert!(locs.contains(&"https://acme.test/articles/big-news"));
        assert!(!locs.contains(&"https://acme.test/articles/draft"));
        assert!(locs.contains(&"https://acme.test/magazines/spring-2024"));
        assert!(locs.contains(&"https://acme.test/leadership/jane-doe"));
        assert!(!locs.iter().any(|l| l.ends_with("/leadership/")));
        assert_eq!(locs.len(), Route::STATIC.len() + 3);

        let article = sitemap
            .urls()
            .iter()
            .find(|u| u.loc.ends_with("big-news"))
            .unwrap();
        assert_eq!(article.lastmod.as_deref(), Some("2024-05-03"));
    }

    #[test]
    fn test_xml_structure() {
        let mut sitemap = Sitemap::default();
        sitemap.push("https://x?a&b", &Route::Home, Some("2025-01-01"));
        sitemap.push("https://x", &Route::Article { slug: "a&b".into() }, None);
        let xml = sitemap.into_xml();

        let lines: Vec<&str> = xml.lines().collect();
        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        assert!(lines[1].starts_with("<urlset"));
        assert!(xml.contains("<loc>https://x?a&amp;b/</loc>"));
        assert!(xml.contains("<lastmod>2025-01-01</lastmod>"));
        assert!(xml.contains("<loc>https://x/articles/a%26b</loc>"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[tokio::test]
    async fn test_build_writes_file() {
        let temp = TempDir::new().unwrap();
        let mut config = crate::config::test_parse_config(
            "[site]\nurl = \"https://acme.test\"\n[sitemap]\nminify = true",
        );
        config.sitemap.path = temp.path().join("public/sitemap.xml");

        let path = build_sitemap(&config, &service()).await.unwrap();
        let xml = fs::read_to_string(path).unwrap();
        assert!(xml.contains("<url><loc>https://acme.test/</loc></url>"));
    }

    #[tokio::test]
    async fn test_build_requires_origin() {
        let config = crate::config::test_parse_config("");
        assert!(build_sitemap(&config, &service()).await.is_err());
    }
}
