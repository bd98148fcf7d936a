//! Open Graph and Twitter Card meta tags.
//!
//! Pure data; `seo::head` renders the tags into HTML.

use super::SeoContext;

/// `og:type` values used by the site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OgType {
    #[default]
    Website,
    Article,
    Profile,
}

impl OgType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Article => "article",
            Self::Profile => "profile",
        }
    }
}

/// Which attribute names the tag: `property` for Open Graph, `name` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaAttr {
    Name,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attr: MetaAttr,
    pub key: &'static str,
    pub content: String,
}

impl MetaTag {
    pub fn name(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attr: MetaAttr::Name,
            key,
            content: content.into(),
        }
    }

    pub fn property(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attr: MetaAttr::Property,
            key,
            content: content.into(),
        }
    }
}

/// Page-specific share metadata.
#[derive(Debug, Clone, Default)]
pub struct OgTags {
    pub og_type: OgType,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    /// Absolute image URL.
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub section: Option<String>,
    pub tags: Vec<String>,
}

impl OgTags {
    /// Open Graph plus Twitter Card tags, site defaults filled from `ctx`.
    pub fn to_meta(&self, ctx: &SeoContext) -> Vec<MetaTag> {
        let mut tags = vec![
            MetaTag::property("og:type", self.og_type.as_str()),
            MetaTag::property("og:title", &self.title),
            MetaTag::property("og:description", &self.description),
            MetaTag::property("og:site_name", &ctx.site_name),
            MetaTag::property("og:locale", &ctx.locale),
        ];
        if let Some(url) = &self.url {
            tags.push(MetaTag::property("og:url", url));
        }

        let image = self.image.as_ref().or(ctx.default_image.as_ref());
        if let Some(image) = image {
            tags.push(MetaTag::property("og:image", image));
            if let Some(alt) = &self.image_alt {
                tags.push(MetaTag::property("og:image:alt", alt));
            }
        }

        if self.og_type == OgType::Article {
            if let Some(published) = &self.published_time {
                tags.push(MetaTag::property("article:published_time", published));
            }
            if let Some(modified) = &self.modified_time {
                tags.push(MetaTag::property("article:modified_time", modified));
            }
            if let Some(section) = &self.section {
                tags.push(MetaTag::property("article:section", section));
            }
            for tag in &self.tags {
                tags.push(MetaTag::property("article:tag", tag));
            }
        }

        let card = if image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        };
        tags.push(MetaTag::name("twitter:card", card));
        if let Some(handle) = &ctx.twitter {
            tags.push(MetaTag::name("twitter:site", handle));
        }
        tags.push(MetaTag::name("twitter:title", &self.title));
        tags.push(MetaTag::name("twitter:description", &self.description));
        if let Some(image) = image {
            tags.push(MetaTag::name("twitter:image", image));
        }
        tags
    }
}
