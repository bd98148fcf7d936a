//! Per-view page heads.
//!
//! Each builder maps one record (or a static view) to a [`PageHead`]:
//! title, description, canonical URL, share tags and JSON-LD, with the
//! BreadcrumbList of the view appended whenever the site has an origin.

use serde_json::Value;

use super::{
    OgType, PageHead, PageSeo, SeoContext,
    meta::normalize_description_or,
    schema::{
        self, ArticleKind, ArticleSchema, IssueSchema, ProfileSchema, breadcrumb_list,
    },
};
use crate::content::{Article, Category, LeadershipProfile, Magazine, PressRelease};
use crate::core::Route;
use crate::utils::html::strip_tags;

/// Organization and WebSite schemas plus share tags for the site root.
pub fn home(ctx: &SeoContext) -> PageHead {
    let json_ld = [ctx.organization(), ctx.website()]
        .into_iter()
        .flatten()
        .collect();
    PageHead::build(
        ctx,
        PageSeo {
            path: "/",
            json_ld,
            ..Default::default()
        },
    )
}

/// Listing, static, admin and not-found views.
pub fn view(ctx: &SeoContext, route: &Route, description: Option<&str>) -> PageHead {
    if *route == Route::Home {
        return home(ctx);
    }
    let path = route.path();
    PageHead::build(
        ctx,
        PageSeo {
            title: route.label(),
            description,
            path: &path,
            noindex: route.noindex(),
            json_ld: with_breadcrumbs(ctx, route, None, Vec::new()),
            ..Default::default()
        },
    )
}

pub fn article(ctx: &SeoContext, article: &Article, category: Option<&Category>) -> PageHead {
    let route = Route::Article {
        slug: article.slug.clone(),
    };
    let path = route.path();
    let description = summary(article.excerpt.as_deref(), article.content.as_deref(), ctx);
    let url = ctx.url(&path);
    let image = article.image_url.as_deref().map(|i| ctx.absolute(i));
    let section = category.map(|c| c.name.as_str());

    let schema = schema::article(&ArticleSchema {
        kind: ArticleKind::NewsArticle,
        headline: &article.title,
        description: Some(description.as_str()),
        image: image.as_deref(),
        url: url.as_deref(),
        author: article.author.as_deref().filter(|a| !a.trim().is_empty()),
        date_published: article.published_at.as_deref(),
        date_modified: article.last_modified(),
        section,
        keywords: &article.tags,
        publisher: Some(ctx.publisher()),
    });

    PageHead::build(
        ctx,
        PageSeo {
            title: Some(article.title.as_str()),
            description: Some(description.as_str()),
            path: &path,
            image: image.as_deref(),
            og_type: OgType::Article,
            published_time: article.published_at.as_deref(),
            modified_time: article.updated_at.as_deref(),
            section,
            tags: &article.tags,
            json_ld: with_breadcrumbs(ctx, &route, Some(article.title.as_str()), vec![schema]),
            ..Default::default()
        },
    )
}

pub fn press_release(ctx: &SeoContext, release: &PressRelease) -> PageHead {
    let route = Route::PressRelease {
        slug: release.slug.clone(),
    };
    let path = route.path();
    let description = summary(release.excerpt.as_deref(), release.content.as_deref(), ctx);
    let url = ctx.url(&path);
    let image = release.image_url.as_deref().map(|i| ctx.absolute(i));

    let schema = schema::article(&ArticleSchema {
        kind: ArticleKind::PressRelease,
        headline: &release.title,
        description: Some(description.as_str()),
        image: image.as_deref(),
        url: url.as_deref(),
        date_published: release.published_at.as_deref(),
        publisher: Some(ctx.publisher()),
        ..Default::default()
    });

    PageHead::build(
        ctx,
        PageSeo {
            title: Some(release.title.as_str()),
            description: Some(description.as_str()),
            path: &path,
            image: image.as_deref(),
            og_type: OgType::Article,
            published_time: release.published_at.as_deref(),
            section: Some("Press Releases"),
            json_ld: with_breadcrumbs(ctx, &route, Some(release.title.as_str()), vec![schema]),
            ..Default::default()
        },
    )
}

pub fn profile(ctx: &SeoContext, profile: &LeadershipProfile) -> PageHead {
    let route = Route::Profile {
        slug: profile.slug.clone(),
    };
    let path = route.path();
    let bio = profile.bio.as_deref().map(strip_tags);
    let description = match (&profile.title, &profile.company) {
        _ if bio.as_deref().is_some_and(|b| !b.trim().is_empty()) => bio.clone(),
        (Some(title), Some(company)) => Some(format!("{} - {title} at {company}", profile.name)),
        (Some(title), None) => Some(format!("{} - {title}", profile.name)),
        _ => None,
    };
    let description = normalize_description_or(description.as_deref(), &ctx.description);
    let url = ctx.url(&path);
    let image = profile.image_url.as_deref().map(|i| ctx.absolute(i));
    let same_as = profile.same_as();

    let schema = schema::profile_page(&ProfileSchema {
        name: &profile.name,
        description: Some(description.as_str()),
        image: image.as_deref(),
        job_title: profile.title.as_deref(),
        url: url.as_deref(),
        works_for: profile.company.as_deref(),
        same_as: &same_as,
    });

    PageHead::build(
        ctx,
        PageSeo {
            title: Some(profile.name.as_str()),
            description: Some(description.as_str()),
            path: &path,
            image: image.as_deref(),
            og_type: OgType::Profile,
            json_ld: with_breadcrumbs(ctx, &route, Some(profile.name.as_str()), vec![schema]),
            ..Default::default()
        },
    )
}

pub fn magazine(ctx: &SeoContext, magazine: &Magazine) -> PageHead {
    let route = Route::Magazine {
        slug: magazine.slug.clone(),
    };
    let path = route.path();
    let description = normalize_description_or(magazine.description.as_deref(), &ctx.description);
    let url = ctx.url(&path);
    let image = magazine.cover_image_url.as_deref().map(|i| ctx.absolute(i));

    let schema = schema::publication_issue(&IssueSchema {
        name: &magazine.title,
        description: Some(description.as_str()),
        image: image.as_deref(),
        url: url.as_deref(),
        date_published: magazine.publish_date.as_deref(),
        issue_number: magazine.issue_number.as_deref(),
        publisher: Some(ctx.publisher()),
    });

    PageHead::build(
        ctx,
        PageSeo {
            title: Some(magazine.title.as_str()),
            description: Some(description.as_str()),
            path: &path,
            image: image.as_deref(),
            json_ld: with_breadcrumbs(ctx, &route, Some(magazine.title.as_str()), vec![schema]),
            ..Default::default()
        },
    )
}

pub fn category(ctx: &SeoContext, category: &Category) -> PageHead {
    let route = Route::Category {
        slug: category.slug.clone(),
    };
    let path = route.path();
    PageHead::build(
        ctx,
        PageSeo {
            title: Some(category.name.as_str()),
            description: category.description.as_deref(),
            path: &path,
            json_ld: with_breadcrumbs(ctx, &route, Some(category.name.as_str()), Vec::new()),
            ..Default::default()
        },
    )
}

/// Excerpt, else the body as plain text, normalized.
fn summary(excerpt: Option<&str>, content: Option<&str>, ctx: &SeoContext) -> String {
    let excerpt = excerpt.filter(|e| !e.trim().is_empty());
    let body = content.map(strip_tags);
    normalize_description_or(excerpt.or(body.as_deref()), &ctx.description)
}

fn with_breadcrumbs(
    ctx: &SeoContext,
    route: &Route,
    leaf: Option<&str>,
    mut json_ld: Vec<Value>,
) -> Vec<Value> {
    let trail = route.breadcrumbs(ctx.origin.as_deref(), leaf);
    if trail.len() > 1 {
        json_ld.push(breadcrumb_list(&trail));
    }
    json_ld
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AdminView;

    fn article_fixture() -> Article {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Big News",
            "slug": "big-news",
            "content": "<p>Something   <b>big</b> happened.</p>",
            "image_url": "/img/a.jpg",
            "author": "Jane Doe",
            "tags": ["ai"],
            "published_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_home_has_site_schemas() {
        let head = home(&SeoContext::for_tests());
        let types: Vec<&str> = head
            .json_ld
            .iter()
            .filter_map(|v| v["@type"].as_str())
            .collect();
        assert_eq!(types, ["Organization", "WebSite"]);
        assert_eq!(head.title, "Acme");
        assert_eq!(head.canonical.as_deref(), Some("https://acme.test/"));
    }

    #[test]
    fn test_article_head() {
        let ctx = SeoContext::for_tests();
        let category: Category = serde_json::from_value(serde_json::json!({
            "id": 9, "name": "Tech", "slug": "tech"
        }))
        .unwrap();
        let head = article(&ctx, &article_fixture(), Some(&category));

        assert_eq!(head.title, "Big News | Acme");
        assert_eq!(head.description, "Something big happened.");
        assert_eq!(head.json_ld[0]["@type"], "NewsArticle");
        assert_eq!(head.json_ld[0]["articleSection"], "Tech");
        assert_eq!(head.json_ld[0]["image"][0], "https://acme.test/img/a.jpg");
        assert_eq!(head.json_ld[1]["@type"], "BreadcrumbList");
        assert_eq!(head.json_ld[1]["itemListElement"][2]["name"], "Big News");
        assert!(head.meta.iter().any(|t| t.key == "article:section" && t.content == "Tech"));
    }

    #[test]
    fn test_profile_description_fallbacks() {
        let ctx = SeoContext::for_tests();
        let jane: LeadershipProfile = serde_json::from_value(serde_json::json!({
            "id": 3, "name": "Jane Doe", "slug": "jane-doe",
            "title": "CEO", "company": "Globex",
            "linkedin_url": "https://linkedin.com/in/jane"
        }))
        .unwrap();
        let head = profile(&ctx, &jane);
        assert_eq!(head.description, "Jane Doe - CEO at Globex");

        let page = &head.json_ld[0];
        assert_eq!(page["@type"], "ProfilePage");
        assert_eq!(page["mainEntity"]["jobTitle"], "CEO");
        assert_eq!(page["mainEntity"]["sameAs"][0], "https://linkedin.com/in/jane");
    }

    #[test]
    fn test_magazine_head() {
        let ctx = SeoContext::for_tests();
        let issue: Magazine = serde_json::from_value(serde_json::json!({
            "id": 7, "title": "Spring 2024", "slug": "spring-2024", "issue_number": 12
        }))
        .unwrap();
        let head = magazine(&ctx, &issue);
        assert_eq!(head.json_ld[0]["@type"], "PublicationIssue");
        assert_eq!(head.json_ld[0]["issueNumber"], "12");
        assert_eq!(head.json_ld[0]["isPartOf"]["name"], "Acme Media");
        assert_eq!(head.description, "Acme stories.");
    }

    #[test]
    fn test_admin_view_noindex_without_breadcrumbs() {
        let ctx = SeoContext::for_tests();
        let head = view(&ctx, &Route::Admin(AdminView::Settings), None);
        assert_eq!(head.robots, "noindex, nofollow");
        assert!(head.json_ld.is_empty());
    }

    #[test]
    fn test_listing_view() {
        let ctx = SeoContext::for_tests();
        let head = view(&ctx, &Route::PressReleases, Some("Company announcements."));
        assert_eq!(head.title, "Press Releases | Acme");
        assert_eq!(head.description, "Company announcements.");
        assert_eq!(head.json_ld[0]["itemListElement"][1]["item"], "https://acme.test/press-releases");
    }

    #[test]
    fn test_no_origin_no_breadcrumbs() {
        let mut ctx = SeoContext::for_tests();
        ctx.origin = None;
        let head = article(&ctx, &article_fixture(), None);
        assert_eq!(head.json_ld.len(), 1);
        assert!(head.json_ld[0].get("mainEntityOfPage").is_none());
    }
}
