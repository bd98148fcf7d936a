//! Typed content records.
//!
//! Rows arrive as loosely shaped JSON: ids may be strings or integers,
//! optional columns may be missing or null. Decoding applies every default
//! once here so read sites never need fallbacks. Asset URL columns are
//! rewritten onto the current storage host right after decoding.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Collection, Direction};
use crate::storage::StorageUrls;

/// A row type bound to its collection.
pub trait Record: for<'de> Deserialize<'de> + Serialize + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Ordering applied by list reads without an explicit order.
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = None;

    /// Value of the key column.
    fn key(&self) -> &str;

    /// Rewrite stored asset URLs.
    fn normalize_urls(&mut self, _urls: &StorageUrls) {}
}

/// Records addressable by a unique slug.
pub trait Slugged: Record {
    fn slug(&self) -> &str;
}

// ============================================================================
// lenient field decoding
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Uint(n) => n.to_string(),
        }
    }
}

/// String or integer id, held as a string.
fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

/// Optional string-or-integer id.
fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// Null counts as the type's default.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ============================================================================
// records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "or_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Record for Article {
    const COLLECTION: Collection = Collection::Articles;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("published_at", Direction::Desc));

    fn key(&self) -> &str {
        &self.id
    }

    fn normalize_urls(&mut self, urls: &StorageUrls) {
        urls.normalize_field(&mut self.image_url);
    }
}

impl Slugged for Article {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Article {
    /// Most recent of `updated_at`, `published_at`, `created_at`.
    pub fn last_modified(&self) -> Option<&str> {
        self.updated_at
            .as_deref()
            .or(self.published_at.as_deref())
            .or(self.created_at.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Category {
    const COLLECTION: Collection = Collection::Categories;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = Some(("name", Direction::Asc));

    fn key(&self) -> &str {
        &self.id
    }
}

impl Slugged for Category {
    fn slug(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLogo {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub display_order: i64,
}

impl Record for ClientLogo {
    const COLLECTION: Collection = Collection::ClientLogos;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("display_order", Direction::Asc));

    fn key(&self) -> &str {
        &self.id
    }

    fn normalize_urls(&mut self, urls: &StorageUrls) {
        urls.normalize_field(&mut self.logo_url);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipProfile {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub display_order: i64,
}

impl Record for LeadershipProfile {
    const COLLECTION: Collection = Collection::LeadershipProfiles;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("display_order", Direction::Asc));

    fn key(&self) -> &str {
        &self.id
    }

    fn normalize_urls(&mut self, urls: &StorageUrls) {
        urls.normalize_field(&mut self.image_url);
    }
}

impl Slugged for LeadershipProfile {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl LeadershipProfile {
    /// Social profile links present on the record.
    pub fn same_as(&self) -> Vec<String> {
        [&self.linkedin_url, &self.twitter_url]
            .into_iter()
            .flatten()
            .filter(|url| !url.is_empty())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magazine {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub issue_number: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Record for Magazine {
    const COLLECTION: Collection = Collection::Magazines;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("publish_date", Direction::Desc));

    fn key(&self) -> &str {
        &self.id
    }

    fn normalize_urls(&mut self, urls: &StorageUrls) {
        urls.normalize_field(&mut self.cover_image_url);
        urls.normalize_field(&mut self.pdf_url);
    }
}

impl Slugged for Magazine {
    fn slug(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagazineArticle {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "id")]
    pub magazine_id: String,
    #[serde(deserialize_with = "id")]
    pub article_id: String,
    #[serde(default)]
    pub page_number: Option<i64>,
}

impl Record for MagazineArticle {
    const COLLECTION: Collection = Collection::MagazineArticles;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("page_number", Direction::Asc));

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressRelease {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Record for PressRelease {
    const COLLECTION: Collection = Collection::PressReleases;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("published_at", Direction::Desc));

    fn key(&self) -> &str {
        &self.id
    }

    fn normalize_urls(&mut self, urls: &StorageUrls) {
        urls.normalize_field(&mut self.image_url);
    }
}

impl Slugged for PressRelease {
    fn slug(&self) -> &str {
        &self.slug
    }
}

/// Remote key/value setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl Record for SettingRecord {
    const COLLECTION: Collection = Collection::Settings;

    fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingEdition {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Record for UpcomingEdition {
    const COLLECTION: Collection = Collection::UpcomingEditions;
    const DEFAULT_ORDER: Option<(&'static str, Direction)> =
        Some(("release_date", Direction::Asc));

    fn key(&self) -> &str {
        &self.id
    }

    fn normalize_urls(&mut self, urls: &StorageUrls) {
        urls.normalize_field(&mut self.cover_image_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_lenient_decode() {
        let article: Article = serde_json::from_value(json!({
            "id": 12,
            "title": "Hello",
            "slug": "hello",
            "excerpt": null,
            "category_id": 3,
            "is_featured": null,
            "tags": null,
            "unknown_column": true,
        }))
        .unwrap();

        assert_eq!(article.id, "12");
        assert_eq!(article.category_id.as_deref(), Some("3"));
        assert!(!article.is_featured);
        assert!(article.tags.is_empty());
        assert!(article.excerpt.is_none());
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_missing_id_is_error() {
        assert!(serde_json::from_value::<Category>(json!({"name": "x"})).is_err());
    }

    #[test]
    fn test_uuid_id() {
        let profile: LeadershipProfile = serde_json::from_value(json!({
            "id": "6f1c2d9e-0000-4000-8000-000000000001",
            "name": "Ada",
            "display_order": null,
        }))
        .unwrap();
        assert_eq!(profile.id, "6f1c2d9e-0000-4000-8000-000000000001");
        assert_eq!(profile.display_order, 0);
        assert_eq!(profile.slug, "");
    }

    #[test]
    fn test_normalize_urls() {
        let urls = StorageUrls::new(Some("https://new.supabase.co"), "supabase.co");
        let mut magazine: Magazine = serde_json::from_value(json!({
            "id": 1,
            "title": "Issue 1",
            "cover_image_url": "https://old.supabase.co/storage/v1/object/public/media/c.jpg",
            "pdf_url": "/placeholder.svg",
        }))
        .unwrap();
        magazine.normalize_urls(&urls);
        assert_eq!(
            magazine.cover_image_url.as_deref(),
            Some("https://new.supabase.co/storage/v1/object/public/media/c.jpg")
        );
        assert_eq!(magazine.pdf_url.as_deref(), Some("/placeholder.svg"));
    }

    #[test]
    fn test_profile_same_as() {
        let profile: LeadershipProfile = serde_json::from_value(json!({
            "id": 1,
            "name": "Ada",
            "linkedin_url": "https://linkedin.com/in/ada",
            "twitter_url": "",
        }))
        .unwrap();
        assert_eq!(profile.same_as(), vec!["https://linkedin.com/in/ada".to_string()]);
    }

    #[test]
    fn test_article_last_modified() {
        let article: Article = serde_json::from_value(json!({
            "id": 1,
            "published_at": "2024-05-01T00:00:00Z",
            "created_at": "2024-04-30T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(article.last_modified(), Some("2024-05-01T00:00:00Z"));
    }
}
