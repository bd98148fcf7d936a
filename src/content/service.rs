//! Typed, cached access to content collections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{
    Article, Backend, BackendError, CacheScope, CachedRows, Collection, ContentError, Magazine,
    MagazineArticle, Query, QueryCache, Record, SettingRecord, Slugged,
};
use crate::debug;
use crate::storage::StorageUrls;
use crate::utils::slug::slugify;

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub articles: usize,
    pub magazines: usize,
    pub leadership_profiles: usize,
    pub press_releases: usize,
}

const STATS_KEY: &str = "counts";

/// Content access over a backend.
///
/// Reads are cached per (collection, query) and retried once on transient
/// failure. Writes go straight to the backend, are never retried, and
/// invalidate every cached view derived from the written collection.
pub struct ContentService<B> {
    backend: B,
    urls: StorageUrls,
    cache: QueryCache,
}

impl<B: Backend> ContentService<B> {
    pub fn new(backend: B, urls: StorageUrls) -> Self {
        Self {
            backend,
            urls,
            cache: QueryCache::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn urls(&self) -> &StorageUrls {
        &self.urls
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ========================================================================
    // reads
    // ========================================================================

    /// Raw rows of a query, cached.
    pub async fn fetch(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<CachedRows, ContentError> {
        let scope = CacheScope::Collection(collection);
        let key = query.to_query_string();

        if let Some(rows) = self.cache.get(scope, &key) {
            debug!("content"; "cache hit {collection}?{key}");
            return Ok(rows);
        }

        let generation = self.cache.generation(scope);
        let rows = Arc::new(self.select_with_retry(collection, query).await?);

        if !self
            .cache
            .insert_if_current(scope, key, generation, Arc::clone(&rows))
        {
            debug!("content"; "{collection} changed during read, result not cached");
        }
        Ok(rows)
    }

    async fn select_with_retry(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        match self.backend.select(collection, query).await {
            Err(err) if err.is_retryable() => {
                debug!("content"; "retrying {collection} read after: {err}");
                self.backend.select(collection, query).await
            }
            result => result,
        }
    }

    /// Decode rows and normalize their asset URLs.
    fn decode<T: Record>(&self, rows: &[Value]) -> Result<Vec<T>, ContentError> {
        rows.iter()
            .map(|row| {
                let mut record: T =
                    serde_json::from_value(row.clone()).map_err(|source| ContentError::Decode {
                        collection: T::COLLECTION,
                        source,
                    })?;
                record.normalize_urls(&self.urls);
                Ok(record)
            })
            .collect()
    }

    /// Records matching `query`. Falls back to the record's default order.
    pub async fn list<T: Record>(&self, query: Query) -> Result<Vec<T>, ContentError> {
        let query = match T::DEFAULT_ORDER {
            Some((column, direction)) if !query.has_order() => query.order(column, direction),
            _ => query,
        };
        let rows = self.fetch(T::COLLECTION, &query).await?;
        self.decode(&rows)
    }

    pub async fn list_all<T: Record>(&self) -> Result<Vec<T>, ContentError> {
        self.list(Query::new()).await
    }

    /// Single record by key column; absent rows are `NotFound`.
    pub async fn get_by_id<T: Record>(&self, id: &str) -> Result<T, ContentError> {
        let collection = T::COLLECTION;
        let query = Query::new().eq(collection.key_column(), id).limit(1);
        self.first(query, id).await
    }

    pub async fn get_by_slug<T: Slugged>(&self, slug: &str) -> Result<T, ContentError> {
        let query = Query::new().eq("slug", slug).limit(1);
        self.first(query, slug).await
    }

    async fn first<T: Record>(&self, query: Query, key: &str) -> Result<T, ContentError> {
        let rows = self.fetch(T::COLLECTION, &query).await?;
        self.decode::<T>(&rows)?
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound {
                collection: T::COLLECTION,
                key: key.to_string(),
            })
    }

    // ========================================================================
    // collection-specific reads
    // ========================================================================

    pub async fn latest_articles(&self, limit: usize) -> Result<Vec<Article>, ContentError> {
        self.list(Query::new().not_null("published_at").limit(limit))
            .await
    }

    pub async fn featured_articles(&self, limit: usize) -> Result<Vec<Article>, ContentError> {
        self.list(Query::new().eq("is_featured", true).limit(limit))
            .await
    }

    pub async fn articles_in_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Article>, ContentError> {
        self.list(Query::new().eq("category_id", category_id)).await
    }

    /// Most recent issue, if any.
    pub async fn latest_magazine(&self) -> Result<Option<Magazine>, ContentError> {
        Ok(self.list(Query::new().limit(1)).await?.into_iter().next())
    }

    /// Articles of an issue, in page order, joined to their article rows.
    pub async fn magazine_contents(
        &self,
        magazine_id: &str,
    ) -> Result<Vec<(MagazineArticle, Article)>, ContentError> {
        let links: Vec<MagazineArticle> = self
            .list(Query::new().eq("magazine_id", magazine_id))
            .await?;

        let mut contents = Vec::with_capacity(links.len());
        for link in links {
            match self.get_by_id::<Article>(&link.article_id).await {
                Ok(article) => contents.push((link, article)),
                Err(ContentError::NotFound { .. }) => {
                    debug!("content"; "issue {magazine_id} links missing article {}", link.article_id);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(contents)
    }

    /// Remote key/value settings.
    pub async fn list_settings(&self) -> Result<Vec<SettingRecord>, ContentError> {
        self.list_all().await
    }

    /// Row counts for the admin dashboard, cached as one aggregate.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ContentError> {
        let scope = CacheScope::DashboardStats;
        if let Some(rows) = self.cache.get(scope, STATS_KEY)
            && let Some(row) = rows.first()
            && let Ok(stats) = serde_json::from_value(row.clone())
        {
            return Ok(stats);
        }

        let generation = self.cache.generation(scope);
        let count = |collection: Collection| async move {
            let query = Query::new().select(collection.key_column());
            self.select_with_retry(collection, &query)
                .await
                .map(|rows| rows.len())
        };

        let stats = DashboardStats {
            articles: count(Collection::Articles).await?,
            magazines: count(Collection::Magazines).await?,
            leadership_profiles: count(Collection::LeadershipProfiles).await?,
            press_releases: count(Collection::PressReleases).await?,
        };

        let row = serde_json::to_value(stats).map_err(|source| ContentError::Decode {
            collection: Collection::Articles,
            source,
        })?;
        self.cache
            .insert_if_current(scope, STATS_KEY.to_string(), generation, Arc::new(vec![row]));
        Ok(stats)
    }

    // ========================================================================
    // writes
    // ========================================================================

    /// Insert a record. Collections with slugs get one derived from the
    /// title (or name) when the draft has none.
    pub async fn create<T: Record>(&self, draft: &impl Serialize) -> Result<T, ContentError> {
        let collection = T::COLLECTION;
        let mut row = to_row(collection, draft)?;
        fill_slug(collection, &mut row);

        let result = self.backend.insert(collection, vec![row]).await;
        self.after_write(collection, result.is_ok());
        self.single_affected(result?, "new row")
    }

    /// Patch the record with key `id`.
    pub async fn update<T: Record>(
        &self,
        id: &str,
        patch: &impl Serialize,
    ) -> Result<T, ContentError> {
        let collection = T::COLLECTION;
        let patch = to_row(collection, patch)?;
        let query = Query::new().eq(collection.key_column(), id);

        let result = self.backend.update(collection, &query, patch).await;
        self.after_write(collection, result.is_ok());
        self.single_affected(result?, id)
    }

    /// Delete the record with key `id`. Deleting a missing row is `NotFound`.
    pub async fn delete<T: Record>(&self, id: &str) -> Result<(), ContentError> {
        let collection = T::COLLECTION;
        let query = Query::new().eq(collection.key_column(), id);

        let result = self.backend.delete(collection, &query).await;
        self.after_write(collection, result.is_ok());
        if result?.is_empty() {
            return Err(ContentError::NotFound {
                collection,
                key: id.to_string(),
            });
        }
        Ok(())
    }

    /// Write a remote setting, creating the row if needed.
    pub async fn upsert_setting(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> Result<SettingRecord, ContentError> {
        let collection = Collection::Settings;
        let row = json!({ "key": key, "value": value });

        let result = self.backend.upsert(collection, vec![row], "key").await;
        self.after_write(collection, result.is_ok());
        self.single_affected(result?, key)
    }

    fn single_affected<T: Record>(&self, rows: Vec<Value>, key: &str) -> Result<T, ContentError> {
        self.decode::<T>(&rows)?
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound {
                collection: T::COLLECTION,
                key: key.to_string(),
            })
    }

    /// Invalidate views derived from `collection`.
    ///
    /// Failed writes invalidate too: the backend may have applied part of
    /// the request before failing.
    fn after_write(&self, collection: Collection, ok: bool) {
        if !ok {
            debug!("content"; "write to {collection} failed, invalidating anyway");
        }
        self.invalidate(collection);
    }

    /// Drop cached views of `collection`, its related collections and the
    /// dashboard counts.
    pub fn invalidate(&self, collection: Collection) {
        self.cache.invalidate(CacheScope::Collection(collection));
        for related in collection.related() {
            self.cache.invalidate(CacheScope::Collection(*related));
        }
        self.cache.invalidate(CacheScope::DashboardStats);
    }
}

fn to_row(collection: Collection, value: &impl Serialize) -> Result<Value, ContentError> {
    match serde_json::to_value(value) {
        Ok(row @ Value::Object(_)) => Ok(row),
        Ok(other) => Err(ContentError::Backend(BackendError::InvalidRequest(format!(
            "{collection} row must be an object, got {other}"
        )))),
        Err(source) => Err(ContentError::Decode { collection, source }),
    }
}

/// Derive `slug` from the collection's source column when missing.
fn fill_slug(collection: Collection, row: &mut Value) {
    if !collection.has_slug() {
        return;
    }
    let Value::Object(fields) = row else { return };

    let has_slug = fields
        .get("slug")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if has_slug {
        return;
    }

    if let Some(source) = fields.get(collection.slug_source()).and_then(Value::as_str) {
        let slug = slugify(source);
        if !slug.is_empty() {
            fields.insert("slug".into(), Value::String(slug));
        }
    }
}
