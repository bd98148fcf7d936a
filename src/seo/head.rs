//! `<head>` fragment assembly.
//!
//! ```text
//! PageSeo (per view) + SeoContext (site) -> PageHead -> HTML
//! ```

use serde_json::Value;

use super::{
    MetaAttr, MetaTag, OgTags, OgType, SeoContext,
    meta::{canonical_url, normalize_description_or, page_title, robots},
    schema::json_ld_script,
};
use crate::utils::html::{escape, escape_attr};

/// Per-view inputs.
#[derive(Debug, Clone, Default)]
pub struct PageSeo<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    /// Site path of the view, e.g. `/articles/big-news`.
    pub path: &'a str,
    pub canonical: Option<&'a str>,
    pub image: Option<&'a str>,
    pub noindex: bool,
    pub og_type: OgType,
    pub published_time: Option<&'a str>,
    pub modified_time: Option<&'a str>,
    pub section: Option<&'a str>,
    pub tags: &'a [String],
    pub json_ld: Vec<Value>,
}

/// Resolved head content of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHead {
    pub title: String,
    pub description: String,
    pub canonical: Option<String>,
    pub robots: &'static str,
    pub meta: Vec<MetaTag>,
    pub json_ld: Vec<Value>,
    /// Trusted script elements (analytics), rendered verbatim.
    pub scripts: Vec<String>,
}

impl PageHead {
    pub fn build(ctx: &SeoContext, page: PageSeo<'_>) -> Self {
        let title = page_title(page.title, &ctx.site_name);
        let description = normalize_description_or(page.description, &ctx.description);
        let canonical = canonical_url(page.canonical, ctx.origin.as_deref(), page.path);

        let og = OgTags {
            og_type: page.og_type,
            title: title.clone(),
            description: description.clone(),
            url: canonical.clone(),
            image: page.image.map(|image| ctx.absolute(image)),
            image_alt: page.title.map(str::to_string),
            published_time: page.published_time.map(str::to_string),
            modified_time: page.modified_time.map(str::to_string),
            section: page.section.map(str::to_string),
            tags: page.tags.to_vec(),
        };

        Self {
            meta: og.to_meta(ctx),
            title,
            description,
            canonical,
            robots: robots(page.noindex),
            json_ld: page.json_ld,
            scripts: Vec::new(),
        }
    }

    pub fn with_scripts(mut self, scripts: impl IntoIterator<Item = String>) -> Self {
        self.scripts.extend(scripts);
        self
    }

    /// HTML fragment for inside `<head>`, one element per line.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.meta.len() + self.json_ld.len() + 4);

        lines.push(format!("<title>{}</title>", escape(&self.title)));
        lines.push(format!(
            "<meta name=\"description\" content=\"{}\">",
            escape_attr(&self.description)
        ));
        lines.push(format!("<meta name=\"robots\" content=\"{}\">", self.robots));
        if let Some(canonical) = &self.canonical {
            lines.push(format!(
                "<link rel=\"canonical\" href=\"{}\">",
                escape_attr(canonical)
            ));
        }

        for tag in &self.meta {
            let attr = match tag.attr {
                MetaAttr::Name => "name",
                MetaAttr::Property => "property",
            };
            lines.push(format!(
                "<meta {attr}=\"{}\" content=\"{}\">",
                tag.key,
                escape_attr(&tag.content)
            ));
        }

        if !self.json_ld.is_empty() {
            lines.push(json_ld_script(&self.json_ld));
        }
        lines.extend(self.scripts.iter().cloned());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_resolves_values() {
        let ctx = SeoContext::for_tests();
        let head = PageHead::build(
            &ctx,
            PageSeo {
                title: Some("Leaders"),
                path: "/leadership",
                image: Some("/img/team.jpg"),
                ..Default::default()
            },
        );
        assert_eq!(head.title, "Leaders | Acme");
        assert_eq!(head.description, "Acme stories.");
        assert_eq!(head.canonical.as_deref(), Some("https://acme.test/leadership"));
        assert!(
            head.meta
                .iter()
                .any(|t| t.key == "og:image" && t.content == "https://acme.test/img/team.jpg")
        );
    }

    #[test]
    fn test_render_escapes() {
        let ctx = SeoContext::for_tests();
        let head = PageHead::build(
            &ctx,
            PageSeo {
                title: Some("Q&A <live>"),
                description: Some("\"quoted\""),
                path: "/",
                noindex: true,
                json_ld: vec![json!({"@type": "Thing"})],
                ..Default::default()
            },
        );
        let html = head.render();
        assert!(html.contains("<title>Q&amp;A &lt;live&gt; | Acme</title>"));
        assert!(html.contains("content=\"&quot;quoted&quot;\""));
        assert!(html.contains("<meta name=\"robots\" content=\"noindex, nofollow\">"));
        assert!(html.contains("<meta property=\"og:type\" content=\"website\">"));
        assert!(html.contains("application/ld+json"));
    }

    #[test]
    fn test_no_canonical_without_origin() {
        let mut ctx = SeoContext::for_tests();
        ctx.origin = None;
        let head = PageHead::build(&ctx, PageSeo { path: "/about", ..Default::default() });
        assert!(head.canonical.is_none());
        assert!(!head.render().contains("rel=\"canonical\""));
    }

    #[test]
    fn test_scripts_rendered_last() {
        let ctx = SeoContext::for_tests();
        let head = PageHead::build(&ctx, PageSeo::default())
            .with_scripts(["<script src=\"/a.js\"></script>".to_string()]);
        assert!(head.render().ends_with("<script src=\"/a.js\"></script>"));
    }
}
