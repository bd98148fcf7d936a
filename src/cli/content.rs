//! `masthead content` command.

use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;

use super::args::{ContentAction, QueryArgs};
use super::common::{Workspace, parse_object, print_json, scalar, split_pair};
use crate::content::{
    Article, Backend, Category, ClientLogo, Collection, ContentError, ContentService, Direction,
    LeadershipProfile, Magazine, MagazineArticle, PressRelease, Query, SettingRecord,
    UpcomingEdition,
};
use crate::log;
use crate::utils::plural_count;

/// Run `$body` with `$T` bound to the record type of `$collection`.
macro_rules! for_record {
    ($collection:expr, $T:ident => $body:expr) => {
        match $collection {
            Collection::Articles => {
                type $T = Article;
                $body
            }
            Collection::Categories => {
                type $T = Category;
                $body
            }
            Collection::ClientLogos => {
                type $T = ClientLogo;
                $body
            }
            Collection::LeadershipProfiles => {
                type $T = LeadershipProfile;
                $body
            }
            Collection::Magazines => {
                type $T = Magazine;
                $body
            }
            Collection::MagazineArticles => {
                type $T = MagazineArticle;
                $body
            }
            Collection::PressReleases => {
                type $T = PressRelease;
                $body
            }
            Collection::Settings => {
                type $T = SettingRecord;
                $body
            }
            Collection::UpcomingEditions => {
                type $T = UpcomingEdition;
                $body
            }
        }
    };
}

pub async fn run(action: &ContentAction, ws: &Workspace) -> Result<()> {
    let content = ws.content()?;
    execute(action, &content).await
}

async fn execute<B: Backend>(action: &ContentAction, content: &ContentService<B>) -> Result<()> {
    match action {
        ContentAction::List { query, pretty } => {
            let collection = query.collection;
            let query = build_query(query)?;
            let rows = for_record!(collection, T => values(content.list::<T>(query).await?)?);
            log!("content"; "{}", plural_count(rows.len(), "row"));
            print_json(&rows, *pretty)
        }
        ContentAction::Get {
            collection,
            key,
            slug,
            pretty,
        } => {
            let row = if *slug {
                if !collection.has_slug() {
                    bail!("{collection} has no slug column");
                }
                let query = Query::new().eq("slug", key.as_str()).limit(1);
                let rows = for_record!(*collection, T => values(content.list::<T>(query).await?)?);
                rows.into_iter().next().ok_or_else(|| ContentError::NotFound {
                    collection: *collection,
                    key: key.clone(),
                })?
            } else {
                for_record!(*collection, T => value(content.get_by_id::<T>(key).await?)?)
            };
            print_json(&row, *pretty)
        }
        ContentAction::Create { collection, json } => {
            let draft = Value::Object(parse_object(json)?);
            let row = for_record!(*collection, T => value(content.create::<T>(&draft).await?)?);
            log!("content"; "created {collection} {}", key_of(*collection, &row));
            print_json(&row, false)
        }
        ContentAction::Update {
            collection,
            id,
            json,
        } => {
            let patch = Value::Object(parse_object(json)?);
            let row = for_record!(*collection, T => value(content.update::<T>(id, &patch).await?)?);
            log!("content"; "updated {collection} {id}");
            print_json(&row, false)
        }
        ContentAction::Delete { collection, id } => {
            for_record!(*collection, T => content.delete::<T>(id).await?);
            log!("content"; "deleted {collection} {id}");
            Ok(())
        }
        ContentAction::Stats => print_json(&content.dashboard_stats().await?, true),
    }
}

/// Query from command-line arguments.
pub(crate) fn build_query(args: &QueryArgs) -> Result<Query> {
    let mut query = Query::new();
    for filter in &args.filters {
        let (column, value) = split_pair(filter)?;
        query = query.eq(column, scalar(value));
    }
    if let Some(order) = &args.order {
        query = match order.rsplit_once('.') {
            Some((column, "desc")) => query.order(column, Direction::Desc),
            Some((column, "asc")) => query.order(column, Direction::Asc),
            _ => query.order(order.as_str(), Direction::Asc),
        };
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    Ok(query)
}

fn value<T: Serialize>(record: T) -> Result<Value> {
    Ok(serde_json::to_value(record)?)
}

fn values<T: Serialize>(records: Vec<T>) -> Result<Vec<Value>> {
    records.into_iter().map(value).collect()
}

fn key_of(collection: Collection, row: &Value) -> String {
    match row.get(collection.key_column()) {
        Some(Value::String(key)) => key.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryBackend;
    use crate::storage::StorageUrls;
    use serde_json::json;

    fn args(collection: Collection) -> QueryArgs {
        QueryArgs {
            collection,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    #[test]
    fn test_build_query() {
        let mut args = args(Collection::Articles);
        args.filters = vec!["is_featured=true".into(), "category_id=3".into()];
        args.order = Some("published_at.desc".into());
        args.limit = Some(5);

        let query = build_query(&args).unwrap();
        let rendered = query.to_query_string();
        assert!(rendered.contains("is_featured=eq.true"));
        assert!(rendered.contains("order=published_at.desc"));
        assert!(rendered.contains("limit=5"));
    }

    #[test]
    fn test_build_query_rejects_bad_filter() {
        let mut args = args(Collection::Articles);
        args.filters = vec!["oops".into()];
        assert!(build_query(&args).is_err());
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let content = ContentService::new(MemoryBackend::new(), StorageUrls::new(None, "supabase.co"));

        let create = ContentAction::Create {
            collection: Collection::Categories,
            json: r#"{"name":"Tech News"}"#.into(),
        };
        execute(&create, &content).await.unwrap();

        let rows = content.backend().rows(Collection::Categories);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["slug"], "tech-news");

        let id = key_of(Collection::Categories, &rows[0]);
        let delete = ContentAction::Delete {
            collection: Collection::Categories,
            id: id.clone(),
        };
        execute(&delete, &content).await.unwrap();
        assert!(execute(&delete, &content).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_slug_requires_slug_column() {
        let content = ContentService::new(MemoryBackend::new(), StorageUrls::new(None, "supabase.co"));
        content
            .backend()
            .seed(Collection::ClientLogos, vec![json!({"id": 1, "name": "Globex"})]);
        let get = ContentAction::Get {
            collection: Collection::ClientLogos,
            key: "globex".into(),
            slug: true,
            pretty: false,
        };
        assert!(execute(&get, &content).await.is_err());
    }
}
