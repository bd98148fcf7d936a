//! Effective site settings.
//!
//! Three layers, increasing precedence:
//!
//! ```text
//! EffectiveSettings::default()          hardcoded
//!         ▲ shallow merge
//! local blob "site-settings"            saved by editors on this client
//!         ▲ field overrides
//! remote `settings` rows                company_name, hero_main_article_id
//! ```
//!
//! `SettingsStore` holds the current value as a lock-free snapshot. Every
//! recompute publishes to a watch channel so consumers re-render without
//! polling.

mod model;

pub use model::{
    EffectiveSettings, HomepageSection, HomepageSections, HomepageSectionsPatch, SettingsPatch,
};

use std::{collections::BTreeMap, sync::Arc};

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::content::{Backend, ContentService, SettingRecord};
use crate::local::{LocalStore, SETTINGS_KEY};
use crate::log;
use crate::utils::hash;

/// Remote key that overrides both `companyName` and `siteTitle`.
pub const REMOTE_COMPANY_NAME: &str = "company_name";
/// Remote key that overrides `heroMainArticleId`.
pub const REMOTE_HERO_ARTICLE: &str = "hero_main_article_id";

/// Whether settings have been computed at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Stale,
    Resolved,
}

/// Last remote key/value table, with a fingerprint for change detection.
#[derive(Debug, Clone)]
struct RemoteSnapshot {
    values: BTreeMap<String, String>,
    fingerprint: u64,
}

impl RemoteSnapshot {
    /// Project rows into a map. Rows with a null value are absent.
    fn from_rows(rows: &[SettingRecord]) -> Self {
        let values: BTreeMap<String, String> = rows
            .iter()
            .filter_map(|row| Some((row.key.clone(), row.value.clone()?)))
            .collect();
        let fingerprint =
            hash::compute_parts(values.iter().flat_map(|(k, v)| [k.as_str(), v.as_str()]));
        Self {
            values,
            fingerprint,
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Apply field-specific overrides.
    fn apply(&self, settings: &mut EffectiveSettings) {
        if let Some(name) = self.get(REMOTE_COMPANY_NAME) {
            settings.company_name = name.to_string();
            settings.site_title = name.to_string();
        }
        settings.hero_main_article_id = self.get(REMOTE_HERO_ARTICLE).map(str::to_string);
    }
}

/// Explicit settings store, passed by reference to consumers.
pub struct SettingsStore {
    local: Arc<dyn LocalStore>,
    remote: RwLock<Option<RemoteSnapshot>>,
    current: ArcSwap<EffectiveSettings>,
    state: RwLock<ResolveState>,
    tx: watch::Sender<Arc<EffectiveSettings>>,
}

impl SettingsStore {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        let initial = Arc::new(EffectiveSettings::default());
        let (tx, _) = watch::channel(Arc::clone(&initial));
        Self {
            local,
            remote: RwLock::new(None),
            current: ArcSwap::new(initial),
            state: RwLock::new(ResolveState::Stale),
            tx,
        }
    }

    /// Current effective settings without recomputing.
    #[inline]
    pub fn current(&self) -> Arc<EffectiveSettings> {
        self.current.load_full()
    }

    pub fn state(&self) -> ResolveState {
        *self.state.read()
    }

    /// Receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<EffectiveSettings>> {
        self.tx.subscribe()
    }

    /// Recompute from defaults, the local blob and the remote snapshot.
    pub fn resolve(&self) -> Arc<EffectiveSettings> {
        let local = self.read_local();
        let mut settings = local.apply_to(&EffectiveSettings::default());
        if let Some(remote) = self.remote.read().as_ref() {
            remote.apply(&mut settings);
        }
        self.publish(settings)
    }

    /// Merge `patch` over the current settings and persist the result.
    ///
    /// Returns `false` (and leaves the current settings untouched) when the
    /// local store rejects the write.
    pub fn save(&self, patch: &SettingsPatch) -> bool {
        let merged = patch.apply_to(&self.current());

        let json = match serde_json::to_string(&merged) {
            Ok(json) => json,
            Err(err) => {
                log!("settings"; "failed to serialize settings: {err}");
                return false;
            }
        };

        if let Err(err) = self.local.set(SETTINGS_KEY, &json) {
            log!("settings"; "failed to save settings: {err}");
            return false;
        }

        let mut settings = merged;
        if let Some(remote) = self.remote.read().as_ref() {
            remote.apply(&mut settings);
        }
        self.publish(settings);
        true
    }

    /// Toggle a single homepage block.
    pub fn update_homepage_section(&self, section: HomepageSection, enabled: bool) -> bool {
        self.save(&SettingsPatch::homepage_section(section, enabled))
    }

    /// Publish the defaults and clear the local blob.
    pub fn reset(&self) {
        self.publish(EffectiveSettings::default());
        if let Err(err) = self.local.remove(SETTINGS_KEY) {
            log!("settings"; "failed to clear saved settings: {err}");
        }
    }

    /// Install a remote settings table. Recomputes only when it changed.
    pub fn apply_remote(&self, rows: &[SettingRecord]) -> bool {
        let snapshot = RemoteSnapshot::from_rows(rows);
        {
            let mut remote = self.remote.write();
            if remote
                .as_ref()
                .is_some_and(|prev| prev.fingerprint == snapshot.fingerprint)
            {
                crate::debug!("settings"; "remote settings unchanged");
                return false;
            }
            crate::debug!("settings"; "remote settings changed ({} keys)", snapshot.values.len());
            *remote = Some(snapshot);
        }
        self.resolve();
        true
    }

    /// Fetch the remote `settings` collection and apply it.
    ///
    /// Fetch failures are logged; the previous snapshot stays in effect.
    pub async fn refresh_remote<B: Backend>(&self, content: &ContentService<B>) -> bool {
        match content.list_settings().await {
            Ok(rows) => self.apply_remote(&rows),
            Err(err) => {
                log!("settings"; "failed to fetch remote settings: {err}");
                false
            }
        }
    }

    /// Parse the local blob. Missing, unreadable or malformed blobs yield an
    /// empty patch.
    fn read_local(&self) -> SettingsPatch {
        let raw = match self.local.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SettingsPatch::default(),
            Err(err) => {
                log!("settings"; "failed to read saved settings: {err}");
                return SettingsPatch::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            log!("settings"; "ignoring malformed saved settings: {err}");
            SettingsPatch::default()
        })
    }

    fn publish(&self, settings: EffectiveSettings) -> Arc<EffectiveSettings> {
        let settings = Arc::new(settings);
        self.current.store(Arc::clone(&settings));
        *self.state.write() = ResolveState::Resolved;
        self.tx.send_replace(Arc::clone(&settings));
        settings
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("current", &self.current())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
