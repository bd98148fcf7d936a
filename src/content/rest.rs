//! HTTP backend speaking PostgREST and the storage object API.
//!
//! ```text
//! GET    {origin}/rest/v1/{table}?select=*&slug=eq.x   select
//! POST   {origin}/rest/v1/{table}                      insert / upsert
//! PATCH  {origin}/rest/v1/{table}?id=eq.1              update
//! DELETE {origin}/rest/v1/{table}?id=eq.1              delete
//! POST   {origin}/storage/v1/object/{bucket}/{path}    upload
//! DELETE {origin}/storage/v1/object/{bucket}           delete objects
//! ```

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::{Value, json};

use super::{Backend, BackendError, Collection, Query};
use crate::config::SiteConfig;
use crate::debug;
use crate::storage::{ObjectStore, StorageUrls, object_path};

/// Return affected rows from writes.
const RETURN_ROWS: &str = "return=representation";

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    origin: String,
    api_key: String,
    urls: StorageUrls,
}

impl RestBackend {
    pub fn new(origin: &str, api_key: impl Into<String>, urls: StorageUrls) -> Self {
        Self {
            client: Client::new(),
            origin: origin.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            urls,
        }
    }

    /// Build from `[backend]`; fails without an origin or API key.
    pub fn from_config(config: &SiteConfig) -> Result<Self, BackendError> {
        let origin = config.backend.origin().ok_or(BackendError::NotConfigured)?;
        let api_key = config.backend.api_key().ok_or(BackendError::NotConfigured)?;
        Ok(Self::new(origin, api_key, StorageUrls::from_config(config)))
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.origin, collection.as_str())
    }

    fn auth_headers(&self) -> Result<HeaderMap, BackendError> {
        let invalid = |_| BackendError::InvalidRequest("API key is not a valid header value".into());
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.api_key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(invalid)?,
        );
        Ok(headers)
    }

    fn request(&self, builder: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        Ok(builder.headers(self.auth_headers()?))
    }

    /// Send and decode a JSON array of rows.
    async fn rows(&self, builder: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let response = check_status(builder.send().await?).await?;
        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    /// Write requests must carry a filter; PostgREST would otherwise touch
    /// every row.
    fn require_filter(query: &Query, op: &str) -> Result<String, BackendError> {
        let filter = query.to_filter_string();
        if filter.is_empty() {
            return Err(BackendError::InvalidRequest(format!(
                "{op} without a filter"
            )));
        }
        Ok(filter)
    }
}

/// Turn non-success responses into `BackendError::Status`.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        let url = format!("{}?{}", self.table_url(collection), query.to_query_string());
        debug!("content"; "GET {url}");
        self.rows(self.request(self.client.get(&url))?).await
    }

    async fn insert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(collection);
        debug!("content"; "POST {url} ({} rows)", rows.len());
        let builder = self
            .request(self.client.post(&url))?
            .header("Prefer", RETURN_ROWS)
            .json(&rows);
        self.rows(builder).await
    }

    async fn upsert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, BackendError> {
        let url = format!("{}?on_conflict={on_conflict}", self.table_url(collection));
        debug!("content"; "POST {url} (upsert {} rows)", rows.len());
        let builder = self
            .request(self.client.post(&url))?
            .header("Prefer", format!("resolution=merge-duplicates,{RETURN_ROWS}"))
            .json(&rows);
        self.rows(builder).await
    }

    async fn update(
        &self,
        collection: Collection,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let filter = Self::require_filter(query, "update")?;
        let url = format!("{}?{filter}", self.table_url(collection));
        debug!("content"; "PATCH {url}");
        let builder = self
            .request(self.client.patch(&url))?
            .header("Prefer", RETURN_ROWS)
            .json(&patch);
        self.rows(builder).await
    }

    async fn delete(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        let filter = Self::require_filter(query, "delete")?;
        let url = format!("{}?{filter}", self.table_url(collection));
        debug!("content"; "DELETE {url}");
        let builder = self
            .request(self.client.delete(&url))?
            .header("Prefer", RETURN_ROWS);
        self.rows(builder).await
    }
}

#[async_trait]
impl ObjectStore for RestBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let path = object_path(path)?;
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.origin);
        debug!("storage"; "POST {url} ({} bytes)", bytes.len());

        let builder = self
            .request(self.client.post(&url))?
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        check_status(builder.send().await?).await?;

        Ok(self.urls.public_url(bucket, path))
    }

    async fn delete(&self, bucket: &str, names: &[String]) -> Result<(), BackendError> {
        if names.is_empty() {
            return Ok(());
        }
        let url = format!("{}/storage/v1/object/{bucket}", self.origin);
        debug!("storage"; "DELETE {url} ({} objects)", names.len());

        let builder = self
            .request(self.client.delete(&url))?
            .json(&json!({ "prefixes": names }));
        check_status(builder.send().await?).await?;
        Ok(())
    }
}
