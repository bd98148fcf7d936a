//! `masthead seo` command.

use anyhow::Result;

use super::args::SeoArgs;
use super::common::{Workspace, print_json};
use crate::consent::{AnalyticsObserver, ConsentManager, HeadScripts};
use crate::content::{
    Article, Backend, Category, ContentService, LeadershipProfile, Magazine, PressRelease,
};
use crate::core::Route;
use crate::seo::{PageHead, SeoContext, page};

pub async fn run(args: &SeoArgs, ws: &Workspace) -> Result<()> {
    let route = Route::parse(&args.path);

    let head = if args.offline || !route_needs_record(&route) {
        if !args.offline {
            ws.refresh_settings().await;
        }
        let ctx = SeoContext::new(&ws.config, &ws.settings.current());
        page::view(&ctx, &route, None)
    } else {
        let content = ws.content()?;
        ws.settings.refresh_remote(&content).await;
        let ctx = SeoContext::new(&ws.config, &ws.settings.current());
        record_head(&ctx, &route, &content).await?
    };

    if args.json {
        return print_json(&head.json_ld, true);
    }

    let mut observer = AnalyticsObserver::new(HeadScripts::new());
    let consent = ConsentManager::new(ws.local.clone());
    observer.sync(consent.state(), &ws.settings.current());
    let head = head.with_scripts(observer.injector().scripts().iter().cloned());

    println!("{}", head.render());
    Ok(())
}

fn route_needs_record(route: &Route) -> bool {
    route.slug().is_some()
}

/// Head of a detail view, loading its record (and article category).
async fn record_head<B: Backend>(
    ctx: &SeoContext,
    route: &Route,
    content: &ContentService<B>,
) -> Result<PageHead> {
    Ok(match route {
        Route::Article { slug } => {
            let article: Article = content.get_by_slug(slug).await?;
            let category = match &article.category_id {
                Some(id) => match content.get_by_id::<Category>(id).await {
                    Ok(category) => Some(category),
                    Err(err) if err.is_not_found() => None,
                    Err(err) => return Err(err.into()),
                },
                None => None,
            };
            page::article(ctx, &article, category.as_ref())
        }
        Route::Category { slug } => {
            page::category(ctx, &content.get_by_slug::<Category>(slug).await?)
        }
        Route::Magazine { slug } => {
            page::magazine(ctx, &content.get_by_slug::<Magazine>(slug).await?)
        }
        Route::Profile { slug } => {
            page::profile(ctx, &content.get_by_slug::<LeadershipProfile>(slug).await?)
        }
        Route::PressRelease { slug } => {
            page::press_release(ctx, &content.get_by_slug::<PressRelease>(slug).await?)
        }
        other => page::view(ctx, other, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Collection, MemoryBackend};
    use crate::storage::StorageUrls;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_head_article_with_category() {
        let backend = MemoryBackend::new();
        backend.seed(
            Collection::Articles,
            vec![json!({"id": 1, "title": "Big News", "slug": "big-news", "category_id": 9})],
        );
        backend.seed(
            Collection::Categories,
            vec![json!({"id": 9, "name": "Tech", "slug": "tech"})],
        );
        let content = ContentService::new(backend, StorageUrls::new(None, "supabase.co"));
        let ctx = SeoContext::for_tests();

        let route = Route::parse("/articles/big-news");
        let head = record_head(&ctx, &route, &content).await.unwrap();
        assert_eq!(head.title, "Big News | Acme");
        assert_eq!(head.json_ld[0]["articleSection"], "Tech");
    }

    #[tokio::test]
    async fn test_record_head_missing_record() {
        let content = ContentService::new(MemoryBackend::new(), StorageUrls::new(None, "supabase.co"));
        let route = Route::parse("/leadership/nobody");
        assert!(record_head(&SeoContext::for_tests(), &route, &content).await.is_err());
    }

    #[test]
    fn test_route_needs_record() {
        assert!(route_needs_record(&Route::parse("/magazines/spring")));
        assert!(!route_needs_record(&Route::parse("/magazines")));
        assert!(!route_needs_record(&Route::parse("/admin/articles/3")));
    }
}
