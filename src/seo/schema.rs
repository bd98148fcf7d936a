//! schema.org structured data (JSON-LD).
//!
//! Each builder takes an options struct and returns a JSON object with
//! `@context` and `@type` first. Optional fields are omitted when absent;
//! no builder emits `null`.
//!
//! ```ignore
//! let crumbs = breadcrumb_list(&[
//!     Crumb::new("Home", "https://x/"),
//!     Crumb::new("Articles", "https://x/articles"),
//! ]);
//! let html = json_ld_script(&[crumbs]);
//! ```

use serde_json::{Map, Value, json};

use crate::utils::html::escape_script_json;

const CONTEXT: &str = "https://schema.org";

/// Placeholder substituted by search engines in a `SearchAction` target.
pub const SEARCH_TERM_TOKEN: &str = "{search_term_string}";

// ============================================================================
// object assembly
// ============================================================================

/// Insertion-ordered JSON object under construction.
struct Schema(Map<String, Value>);

impl Schema {
    fn new(ty: &str) -> Self {
        let mut map = Map::new();
        map.insert("@context".into(), CONTEXT.into());
        map.insert("@type".into(), ty.into());
        Self(map)
    }

    /// Nested object without `@context`.
    fn node(ty: &str) -> Self {
        let mut map = Map::new();
        map.insert("@type".into(), ty.into());
        Self(map)
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    fn opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    fn list(&mut self, key: &str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            self.set(key, values.to_vec());
        }
        self
    }

    fn build(&mut self) -> Value {
        Value::Object(std::mem::take(&mut self.0))
    }
}

/// Organization reference, with its logo as an `ImageObject`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Publisher<'a> {
    pub name: &'a str,
    pub logo: Option<&'a str>,
}

impl Publisher<'_> {
    fn to_value(self) -> Value {
        let mut org = Schema::node("Organization");
        org.set("name", self.name);
        if let Some(logo) = self.logo {
            org.set("logo", json!({ "@type": "ImageObject", "url": logo }));
        }
        org.build()
    }
}

// ============================================================================
// Organization
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct OrganizationSchema<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub logo: Option<&'a str>,
    pub alternate_names: &'a [String],
    pub same_as: &'a [String],
}

pub fn organization(opts: &OrganizationSchema<'_>) -> Value {
    Schema::new("Organization")
        .set("name", opts.name)
        .set("url", opts.url)
        .opt("logo", opts.logo)
        .list("alternateName", opts.alternate_names)
        .list("sameAs", opts.same_as)
        .build()
}

// ============================================================================
// WebSite
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct WebsiteSchema<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub alternate_name: Option<&'a str>,
    /// Search page URL; `{search_term_string}` is appended when missing.
    pub search_url: Option<&'a str>,
}

pub fn website(opts: &WebsiteSchema<'_>) -> Value {
    let mut schema = Schema::new("WebSite");
    schema
        .set("name", opts.name)
        .set("url", opts.url)
        .opt("alternateName", opts.alternate_name);

    if let Some(search_url) = opts.search_url {
        let template = if search_url.contains(SEARCH_TERM_TOKEN) {
            search_url.to_string()
        } else {
            format!("{search_url}{SEARCH_TERM_TOKEN}")
        };
        schema.set(
            "potentialAction",
            json!({
                "@type": "SearchAction",
                "target": { "@type": "EntryPoint", "urlTemplate": template },
                "query-input": "required name=search_term_string",
            }),
        );
    }
    schema.build()
}

// ============================================================================
// Article
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArticleKind {
    #[default]
    Article,
    NewsArticle,
    PressRelease,
}

impl ArticleKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::NewsArticle => "NewsArticle",
            Self::PressRelease => "PressRelease",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArticleSchema<'a> {
    pub kind: ArticleKind,
    pub headline: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub url: Option<&'a str>,
    pub author: Option<&'a str>,
    pub date_published: Option<&'a str>,
    pub date_modified: Option<&'a str>,
    pub section: Option<&'a str>,
    pub keywords: &'a [String],
    pub publisher: Option<Publisher<'a>>,
}

pub fn article(opts: &ArticleSchema<'_>) -> Value {
    let mut schema = Schema::new(opts.kind.as_str());
    schema
        .set("headline", opts.headline)
        .opt("description", opts.description);

    if let Some(image) = opts.image {
        schema.set("image", vec![image]);
    }
    if let Some(url) = opts.url {
        schema.set("mainEntityOfPage", json!({ "@type": "WebPage", "@id": url }));
    }
    if let Some(author) = opts.author {
        schema.set("author", json!({ "@type": "Person", "name": author }));
    }

    schema
        .opt("datePublished", opts.date_published)
        .opt("dateModified", opts.date_modified)
        .opt("articleSection", opts.section);

    if !opts.keywords.is_empty() {
        schema.set("keywords", opts.keywords.join(", "));
    }
    if let Some(publisher) = opts.publisher {
        schema.set("publisher", publisher.to_value());
    }
    schema.build()
}

// ============================================================================
// ProfilePage
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProfileSchema<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub job_title: Option<&'a str>,
    pub url: Option<&'a str>,
    pub works_for: Option<&'a str>,
    pub same_as: &'a [String],
}

pub fn profile_page(opts: &ProfileSchema<'_>) -> Value {
    let mut person = Schema::node("Person");
    person
        .set("name", opts.name)
        .opt("description", opts.description)
        .opt("image", opts.image)
        .opt("jobTitle", opts.job_title)
        .opt("url", opts.url);
    if let Some(company) = opts.works_for {
        person.set("worksFor", json!({ "@type": "Organization", "name": company }));
    }
    person.list("sameAs", opts.same_as);

    Schema::new("ProfilePage")
        .set("mainEntity", person.build())
        .build()
}

// ============================================================================
// PublicationIssue
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct IssueSchema<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub url: Option<&'a str>,
    pub date_published: Option<&'a str>,
    pub issue_number: Option<&'a str>,
    pub publisher: Option<Publisher<'a>>,
}

pub fn publication_issue(opts: &IssueSchema<'_>) -> Value {
    let mut schema = Schema::new("PublicationIssue");
    schema
        .set("name", opts.name)
        .opt("description", opts.description);
    if let Some(image) = opts.image {
        schema.set("image", vec![image]);
    }
    schema
        .opt("url", opts.url)
        .opt("datePublished", opts.date_published)
        .opt("issueNumber", opts.issue_number);

    if let Some(publisher) = opts.publisher {
        schema.set(
            "isPartOf",
            json!({ "@type": "Periodical", "name": publisher.name }),
        );
        schema.set("publisher", publisher.to_value());
    }
    schema.build()
}

// ============================================================================
// BreadcrumbList
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub name: String,
    pub url: String,
}

impl Crumb {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// `ListItem` entries with 1-based positions, in input order.
pub fn breadcrumb_list(crumbs: &[Crumb]) -> Value {
    let items: Vec<Value> = crumbs
        .iter()
        .enumerate()
        .map(|(i, crumb)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": crumb.name,
                "item": crumb.url,
            })
        })
        .collect();

    Schema::new("BreadcrumbList")
        .set("itemListElement", items)
        .build()
}

// ============================================================================
// rendering
// ============================================================================

/// One `<script type="application/ld+json">` element per item.
pub fn json_ld_script(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| {
            let json = serde_json::to_string(item).unwrap_or_default();
            format!(
                "<script type=\"application/ld+json\">{}</script>",
                escape_script_json(&json)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_organization_omits_empty_lists() {
        let org = organization(&OrganizationSchema {
            name: "Acme",
            url: "https://acme.test",
            ..Default::default()
        });
        assert_eq!(keys(&org), ["@context", "@type", "name", "url"]);
        assert_eq!(org["@type"], "Organization");
    }

    #[test]
    fn test_organization_full() {
        let same_as = vec!["https://linkedin.com/company/acme".to_string()];
        let alt = vec!["Acme Inc".to_string()];
        let org = organization(&OrganizationSchema {
            name: "Acme",
            url: "https://acme.test",
            logo: Some("https://acme.test/logo.png"),
            alternate_names: &alt,
            same_as: &same_as,
        });
        assert_eq!(org["logo"], "https://acme.test/logo.png");
        assert_eq!(org["alternateName"], json!(["Acme Inc"]));
        assert_eq!(org["sameAs"], json!(["https://linkedin.com/company/acme"]));
    }

    #[test]
    fn test_website_search_token_appended() {
        let site = website(&WebsiteSchema {
            name: "Acme",
            url: "https://acme.test",
            search_url: Some("https://acme.test/search?q="),
            ..Default::default()
        });
        let action = &site["potentialAction"];
        assert_eq!(action["@type"], "SearchAction");
        assert_eq!(
            action["target"]["urlTemplate"],
            "https://acme.test/search?q={search_term_string}"
        );
        assert_eq!(action["query-input"], "required name=search_term_string");
    }

    #[test]
    fn test_website_search_token_kept() {
        let site = website(&WebsiteSchema {
            name: "Acme",
            url: "https://acme.test",
            search_url: Some("https://acme.test/s/{search_term_string}/all"),
            ..Default::default()
        });
        assert_eq!(
            site["potentialAction"]["target"]["urlTemplate"],
            "https://acme.test/s/{search_term_string}/all"
        );
        assert!(site.get("alternateName").is_none());
    }

    #[test]
    fn test_article_wrapping() {
        let keywords = vec!["ai".to_string(), "leadership".to_string()];
        let article = article(&ArticleSchema {
            kind: ArticleKind::NewsArticle,
            headline: "Big News",
            image: Some("https://acme.test/a.jpg"),
            url: Some("https://acme.test/articles/big-news"),
            author: Some("Ada"),
            keywords: &keywords,
            publisher: Some(Publisher {
                name: "Acme",
                logo: Some("https://acme.test/logo.png"),
            }),
            ..Default::default()
        });

        assert_eq!(article["@type"], "NewsArticle");
        assert_eq!(article["image"], json!(["https://acme.test/a.jpg"]));
        assert_eq!(
            article["mainEntityOfPage"],
            json!({"@type": "WebPage", "@id": "https://acme.test/articles/big-news"})
        );
        assert_eq!(article["author"], json!({"@type": "Person", "name": "Ada"}));
        assert_eq!(article["keywords"], "ai, leadership");
        assert_eq!(article["publisher"]["logo"]["@type"], "ImageObject");
        assert!(article.get("datePublished").is_none());
        assert!(article.get("description").is_none());
    }

    #[test]
    fn test_article_minimal() {
        let article = article(&ArticleSchema {
            headline: "Only a headline",
            ..Default::default()
        });
        assert_eq!(keys(&article), ["@context", "@type", "headline"]);
        assert_eq!(article["@type"], "Article");
    }

    #[test]
    fn test_profile_page() {
        let profile = profile_page(&ProfileSchema {
            name: "Ada Lovelace",
            job_title: Some("CEO"),
            works_for: Some("Acme"),
            ..Default::default()
        });
        let person = &profile["mainEntity"];
        assert_eq!(profile["@type"], "ProfilePage");
        assert_eq!(person["@type"], "Person");
        assert_eq!(person["jobTitle"], "CEO");
        assert_eq!(person["worksFor"], json!({"@type": "Organization", "name": "Acme"}));
        assert!(person.get("sameAs").is_none());
        assert!(person.get("@context").is_none());
    }

    #[test]
    fn test_publication_issue_publisher() {
        let issue = publication_issue(&IssueSchema {
            name: "Issue 12",
            issue_number: Some("12"),
            image: Some("https://acme.test/cover.jpg"),
            publisher: Some(Publisher {
                name: "Acme Quarterly",
                logo: None,
            }),
            ..Default::default()
        });
        assert_eq!(issue["isPartOf"], json!({"@type": "Periodical", "name": "Acme Quarterly"}));
        assert_eq!(issue["publisher"], json!({"@type": "Organization", "name": "Acme Quarterly"}));
        assert_eq!(issue["image"], json!(["https://acme.test/cover.jpg"]));

        let bare = publication_issue(&IssueSchema {
            name: "Issue 13",
            ..Default::default()
        });
        assert!(bare.get("isPartOf").is_none());
        assert!(bare.get("publisher").is_none());
    }

    #[test]
    fn test_breadcrumb_positions() {
        let list = breadcrumb_list(&[
            Crumb::new("Home", "https://x/"),
            Crumb::new("Articles", "https://x/articles"),
        ]);
        let items = list["itemListElement"].as_array().unwrap();
        assert_eq!(items[0]["position"], 1);
        assert_eq!(items[0]["name"], "Home");
        assert_eq!(items[1]["position"], 2);
        assert_eq!(items[1]["item"], "https://x/articles");
    }

    #[test]
    fn test_json_ld_script_escapes() {
        let item = article(&ArticleSchema {
            headline: "</script><script>alert(1)</script>",
            ..Default::default()
        });
        let html = json_ld_script(&[item]);
        assert!(html.starts_with("<script type=\"application/ld+json\">"));
        assert_eq!(html.matches("</script>").count(), 1);
    }
}
