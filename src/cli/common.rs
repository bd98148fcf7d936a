//! Shared state and helpers for CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{BACKEND_KEY_ENV, SiteConfig};
use crate::content::{BackendError, ContentService, RestBackend};
use crate::local::{FileStore, LocalStore};
use crate::settings::SettingsStore;

/// Everything a command needs, built once from the loaded config.
pub struct Workspace {
    pub config: SiteConfig,
    pub local: Arc<dyn LocalStore>,
    pub settings: SettingsStore,
}

impl Workspace {
    pub fn new(config: SiteConfig) -> Self {
        let local: Arc<dyn LocalStore> = Arc::new(FileStore::new(config.local.path.clone()));
        let settings = SettingsStore::new(local.clone());
        settings.resolve();
        Self {
            config,
            local,
            settings,
        }
    }

    /// Content service over the configured backend.
    pub fn content(&self) -> Result<ContentService<RestBackend>> {
        let backend = RestBackend::from_config(&self.config).map_err(|err| match err {
            BackendError::NotConfigured => anyhow!(
                "no backend configured, set [backend].url and anon_key (or {BACKEND_KEY_ENV})"
            ),
            other => anyhow::Error::new(other),
        })?;
        let urls = crate::storage::StorageUrls::from_config(&self.config);
        Ok(ContentService::new(backend, urls))
    }

    /// Pull remote settings when a backend is configured; quiet otherwise.
    pub async fn refresh_settings(&self) {
        match self.content() {
            Ok(content) => {
                self.settings.refresh_remote(&content).await;
            }
            Err(err) => crate::debug!("settings"; "skipping remote settings: {err}"),
        }
    }
}

/// Print `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

/// Split `key=value`.
pub fn split_pair(pair: &str) -> Result<(&str, &str)> {
    let Some((key, value)) = pair.split_once('=') else {
        bail!("expected KEY=VALUE, got '{pair}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{pair}'");
    }
    Ok((key, value))
}

/// JSON value of a command-line scalar: `null`, `true`/`false`, integers,
/// else the literal string.
pub fn scalar(value: &str) -> Value {
    match value {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}

/// Parse a JSON object argument.
pub fn parse_object(json: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(json).context("argument is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, got {other}"),
    }
}
