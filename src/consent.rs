//! Cookie consent and analytics attachment.
//!
//! ```text
//! ConsentManager::set ──broadcast──► AnalyticsObserver ──► AnalyticsInjector
//!                                         ▲                  (attach/detach)
//! SettingsStore ──────watch───────────────┘
//! ```
//!
//! Analytics is attached only while consent is `Accepted` and the effective
//! settings carry a non-empty, well-formed analytics code.

use std::{fmt, str::FromStr, sync::Arc, sync::OnceLock};

use regex::Regex;
use tokio::sync::{broadcast, watch};

use crate::local::{CONSENT_KEY, LocalStore};
use crate::log;
use crate::settings::EffectiveSettings;

const CHANNEL_CAPACITY: usize = 16;

// ============================================================================
// ConsentState
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentState {
    Accepted,
    Rejected,
}

impl ConsentState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accepted" | "accept" => Ok(Self::Accepted),
            "rejected" | "reject" => Ok(Self::Rejected),
            other => Err(format!("unknown consent state '{other}'")),
        }
    }
}

// ============================================================================
// ConsentManager
// ============================================================================

/// Persisted consent choice plus a same-process change signal.
pub struct ConsentManager {
    local: Arc<dyn LocalStore>,
    tx: broadcast::Sender<ConsentState>,
}

impl ConsentManager {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { local, tx }
    }

    /// Stored choice. `None` when undecided, unreadable or unrecognized.
    pub fn state(&self) -> Option<ConsentState> {
        match self.local.get(CONSENT_KEY) {
            Ok(Some(value)) => match value.parse() {
                Ok(state) => Some(state),
                Err(err) => {
                    log!("consent"; "ignoring stored value: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log!("consent"; "failed to read consent: {err}");
                None
            }
        }
    }

    /// Persist and broadcast. Returns `false` (nothing broadcast) when the
    /// choice could not be stored.
    pub fn set(&self, state: ConsentState) -> bool {
        if let Err(err) = self.local.set(CONSENT_KEY, state.as_str()) {
            log!("consent"; "failed to save consent: {err}");
            return false;
        }
        crate::debug!("consent"; "consent {state}");
        // No subscribers is fine.
        let _ = self.tx.send(state);
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsentState> {
        self.tx.subscribe()
    }
}

impl fmt::Debug for ConsentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsentManager")
            .field("subscribers", &self.tx.receiver_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Analytics
// ============================================================================

fn measurement_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap())
}

/// Analytics tag configuration derived from `analytics_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub measurement_id: String,
}

impl AnalyticsConfig {
    /// `None` for blank codes and codes that are not a plain tag id.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        if !measurement_id_regex().is_match(code) {
            log!("consent"; "analytics code '{code}' is not a tag id, ignoring");
            return None;
        }
        Some(Self {
            measurement_id: code.to_string(),
        })
    }

    pub fn from_settings(settings: &EffectiveSettings) -> Option<Self> {
        Self::from_code(&settings.analytics_code)
    }
}

/// Attaches and detaches third-party analytics.
pub trait AnalyticsInjector: Send {
    fn attach(&mut self, config: &AnalyticsConfig);
    fn detach(&mut self);
}

/// Collects gtag script elements for head rendering.
#[derive(Debug, Default)]
pub struct HeadScripts {
    scripts: Vec<String>,
}

impl HeadScripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn is_attached(&self) -> bool {
        !self.scripts.is_empty()
    }
}

impl AnalyticsInjector for HeadScripts {
    fn attach(&mut self, config: &AnalyticsConfig) {
        let id = &config.measurement_id;
        self.scripts = vec![
            format!("<script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>"),
            format!(
                "<script>window.dataLayer=window.dataLayer||[];\
                 function gtag(){{dataLayer.push(arguments);}}\
                 gtag('js',new Date());gtag('config','{id}');</script>"
            ),
        ];
    }

    fn detach(&mut self) {
        self.scripts.clear();
    }
}

/// Keeps an injector in line with consent and settings.
#[derive(Debug)]
pub struct AnalyticsObserver<I> {
    injector: I,
    attached: Option<AnalyticsConfig>,
}

impl<I: AnalyticsInjector> AnalyticsObserver<I> {
    pub fn new(injector: I) -> Self {
        Self {
            injector,
            attached: None,
        }
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn attached(&self) -> Option<&AnalyticsConfig> {
        self.attached.as_ref()
    }

    /// Attach, re-attach or detach so the injector matches the inputs.
    pub fn sync(&mut self, consent: Option<ConsentState>, settings: &EffectiveSettings) {
        let wanted = match consent {
            Some(ConsentState::Accepted) => AnalyticsConfig::from_settings(settings),
            _ => None,
        };
        if wanted == self.attached {
            return;
        }

        if self.attached.take().is_some() {
            self.injector.detach();
            crate::debug!("consent"; "analytics detached");
        }
        if let Some(config) = wanted {
            self.injector.attach(&config);
            crate::debug!("consent"; "analytics attached ({})", config.measurement_id);
            self.attached = Some(config);
        }
    }

    /// Follow consent broadcasts and settings updates until both senders
    /// are gone. Returns the observer for inspection.
    pub async fn run(
        mut self,
        initial: Option<ConsentState>,
        mut consent: broadcast::Receiver<ConsentState>,
        mut settings: watch::Receiver<Arc<EffectiveSettings>>,
    ) -> Self {
        let mut current = initial;
        let snapshot = settings.borrow_and_update().clone();
        self.sync(current, &snapshot);

        let mut consent_open = true;
        let mut settings_open = true;
        while consent_open || settings_open {
            tokio::select! {
                received = consent.recv(), if consent_open => match received {
                    Ok(state) => current = Some(state),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        crate::debug!("consent"; "skipped {skipped} consent events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        consent_open = false;
                        continue;
                    }
                },
                changed = settings.changed(), if settings_open => {
                    if changed.is_err() {
                        settings_open = false;
                        continue;
                    }
                }
            }
            let snapshot = settings.borrow_and_update().clone();
            self.sync(current, &snapshot);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::MemoryStore;

    fn settings_with_code(code: &str) -> EffectiveSettings {
        EffectiveSettings {
            analytics_code: code.into(),
            ..EffectiveSettings::default()
        }
    }

    #[test]
    fn test_consent_parse() {
        assert_eq!("accepted".parse(), Ok(ConsentState::Accepted));
        assert_eq!(" Rejected ".parse(), Ok(ConsentState::Rejected));
        assert!("maybe".parse::<ConsentState>().is_err());
    }

    #[test]
    fn test_manager_persists_under_consent_key() {
        let store = Arc::new(MemoryStore::new());
        let manager = ConsentManager::new(store.clone());
        assert_eq!(manager.state(), None);

        assert!(manager.set(ConsentState::Accepted));
        assert_eq!(store.get(CONSENT_KEY).unwrap().as_deref(), Some("accepted"));
        assert_eq!(manager.state(), Some(ConsentState::Accepted));
    }

    #[test]
    fn test_manager_unknown_value_is_undecided() {
        let store = Arc::new(MemoryStore::new());
        store.set(CONSENT_KEY, "whatever").unwrap();
        assert_eq!(ConsentManager::new(store).state(), None);
    }

    #[test]
    fn test_manager_failed_save_not_broadcast() {
        let store = Arc::new(MemoryStore::with_quota(0));
        let manager = ConsentManager::new(store);
        let mut rx = manager.subscribe();
        assert!(!manager.set(ConsentState::Accepted));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_manager_broadcasts() {
        let manager = ConsentManager::new(Arc::new(MemoryStore::new()));
        let mut rx = manager.subscribe();
        manager.set(ConsentState::Rejected);
        assert_eq!(rx.try_recv().unwrap(), ConsentState::Rejected);
    }

    #[test]
    fn test_analytics_config_from_code() {
        assert_eq!(AnalyticsConfig::from_code("   "), None);
        assert_eq!(AnalyticsConfig::from_code("<script>"), None);
        assert_eq!(
            AnalyticsConfig::from_code(" G-ABC123 ").map(|c| c.measurement_id),
            Some("G-ABC123".to_string())
        );
    }

    #[test]
    fn test_observer_attach_requires_consent_and_code() {
        let mut observer = AnalyticsObserver::new(HeadScripts::new());

        observer.sync(None, &settings_with_code("G-1"));
        assert!(!observer.injector().is_attached());

        observer.sync(Some(ConsentState::Accepted), &settings_with_code(""));
        assert!(!observer.injector().is_attached());

        observer.sync(Some(ConsentState::Accepted), &settings_with_code("G-1"));
        assert!(observer.injector().is_attached());
        assert!(observer.injector().scripts()[0].contains("id=G-1"));

        observer.sync(Some(ConsentState::Rejected), &settings_with_code("G-1"));
        assert!(!observer.injector().is_attached());
        assert!(observer.attached().is_none());
    }

    #[test]
    fn test_observer_reattaches_on_code_change() {
        let mut observer = AnalyticsObserver::new(HeadScripts::new());
        observer.sync(Some(ConsentState::Accepted), &settings_with_code("G-1"));
        observer.sync(Some(ConsentState::Accepted), &settings_with_code("G-2"));
        assert_eq!(observer.attached().unwrap().measurement_id, "G-2");
        assert!(observer.injector().scripts()[1].contains("'G-2'"));
    }

    #[derive(Default)]
    struct Counting {
        attached: usize,
        detached: usize,
    }

    impl AnalyticsInjector for Counting {
        fn attach(&mut self, _: &AnalyticsConfig) {
            self.attached += 1;
        }
        fn detach(&mut self) {
            self.detached += 1;
        }
    }

    #[test]
    fn test_observer_idempotent() {
        let mut observer = AnalyticsObserver::new(Counting::default());
        let settings = settings_with_code("G-1");
        observer.sync(Some(ConsentState::Accepted), &settings);
        observer.sync(Some(ConsentState::Accepted), &settings);
        observer.sync(None, &settings);
        observer.sync(None, &settings);
        assert_eq!(observer.injector().attached, 1);
        assert_eq!(observer.injector().detached, 1);
    }

    #[tokio::test]
    async fn test_observer_follows_broadcasts() {
        let manager = ConsentManager::new(Arc::new(MemoryStore::new()));
        let (settings_tx, settings_rx) = watch::channel(Arc::new(settings_with_code("G-1")));
        let consent_rx = manager.subscribe();

        let task = tokio::spawn(AnalyticsObserver::new(HeadScripts::new()).run(
            None,
            consent_rx,
            settings_rx,
        ));

        manager.set(ConsentState::Accepted);
        drop(manager);
        drop(settings_tx);

        let observer = task.await.unwrap();
        assert!(observer.injector().is_attached());
    }
}
