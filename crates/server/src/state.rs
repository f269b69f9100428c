//! Application State
//!
//! Shared state across all handlers.

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

use sales_assist_agent::{PromotionSelector, SalesAssistant, VariantStore};
use sales_assist_config::{load_settings, Settings};
use sales_assist_persistence::{JsonFileStore, SnapshotStore, StatsAggregator};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration wrapped in RwLock for hot-reload support
    pub config: Arc<RwLock<Settings>>,
    /// Reply orchestration
    pub assistant: Arc<SalesAssistant>,
    /// Snapshot persistence shared by variants and stats
    pub store: Arc<dyn SnapshotStore>,
    /// Environment name for config reload
    env: Option<String>,
}

impl AppState {
    /// Wire state around an existing assistant and store
    pub fn new(config: Settings, assistant: Arc<SalesAssistant>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            assistant,
            store,
            env: None,
        }
    }

    /// Build the full state from settings
    ///
    /// Reads the stats and variants snapshots from the configured data
    /// directory. A generative provider that fails to initialize leaves
    /// premium replies on the variant path.
    pub async fn from_settings(config: Settings, env: Option<String>) -> Self {
        let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileStore::new(&config.storage.data_dir));

        let stats = Arc::new(
            StatsAggregator::load(
                store.clone(),
                config.storage.stats_snapshot.clone(),
                config.assistant.signature_max_chars,
            )
            .await,
        );
        let variants = Arc::new(VariantStore::new(&config.assistant));
        let promotions = Arc::new(PromotionSelector::new(
            config.promotions.clone(),
            config.assistant.promo_max_chars,
        ));

        let generator = match sales_assist_llm::create_generator(&config.llm) {
            Ok(generator) => generator,
            Err(e) => {
                tracing::warn!(error = %e, "Generative provider unavailable, premium replies use variants");
                None
            }
        };

        let assistant = SalesAssistant::new(&config.assistant, variants, promotions, stats)
            .with_generator(generator);

        let mut state = Self::new(config, Arc::new(assistant), store);
        state.env = env;

        if let Err(e) = state.reload_variants().await {
            tracing::warn!(error = %e, "Initial variant load failed, using built-in fallbacks");
        }

        state
    }

    /// Reload the variant table from its snapshot
    ///
    /// A missing or unparseable snapshot installs an empty table. A read
    /// failure keeps the current table and is returned to the caller.
    pub async fn reload_variants(&self) -> Result<usize, ServerError> {
        // parking_lot guards aren't Send; copy the name out before awaiting
        let snapshot = self.config.read().storage.variants_snapshot.clone();
        let variants = self.assistant.variants();

        match self.store.read_snapshot(&snapshot).await {
            Ok(Some(value)) => Ok(variants.load(value)),
            Ok(None) => {
                tracing::warn!(snapshot = %snapshot, "Variant snapshot missing, using built-in fallbacks");
                Ok(variants.load_table(Default::default()))
            }
            Err(e) if e.is_corrupt() => {
                tracing::warn!(snapshot = %snapshot, error = %e, "Variant snapshot corrupt, using built-in fallbacks");
                Ok(variants.load_table(Default::default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reload configuration from files
    ///
    /// Replaces the promotion catalog. Server, storage and assistant
    /// settings are only applied at startup.
    pub fn reload_config(&self) -> Result<(), ServerError> {
        let new_config = load_settings(self.env.as_deref())?;

        self.assistant
            .promotions()
            .replace(new_config.promotions.clone());
        *self.config.write() = new_config;

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }

    /// File backing the variants snapshot
    pub fn variants_path(&self) -> PathBuf {
        let config = self.config.read();
        config
            .storage
            .data_dir
            .join(format!("{}.json", config.storage.variants_snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_assist_persistence::InMemoryStore;
    use serde_json::json;

    async fn state_with(store: impl SnapshotStore + 'static) -> AppState {
        let settings = Settings::default();
        let store: Arc<dyn SnapshotStore> = Arc::new(store);
        let stats = Arc::new(StatsAggregator::load(store.clone(), "stats", 160).await);
        let assistant = SalesAssistant::new(
            &settings.assistant,
            Arc::new(VariantStore::new(&settings.assistant)),
            Arc::new(PromotionSelector::new(Vec::new(), 260)),
            stats,
        );
        AppState::new(settings, Arc::new(assistant), store)
    }

    #[tokio::test]
    async fn test_reload_variants_from_store() {
        let store = InMemoryStore::new().with_snapshot(
            "variants",
            json!({"price": {"discovery": [{"text": "Hola {name}", "weight": 1}]}}),
        );
        let state = state_with(store).await;

        assert_eq!(state.reload_variants().await.unwrap(), 1);
        assert!(state.assistant.variants().is_loaded());
    }

    #[tokio::test]
    async fn test_missing_variants_snapshot_is_empty_table() {
        let state = state_with(InMemoryStore::new()).await;
        assert_eq!(state.reload_variants().await.unwrap(), 0);
        assert!(!state.assistant.variants().is_loaded());
    }

    #[tokio::test]
    async fn test_corrupt_variants_snapshot_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(JsonFileStore::new(dir.path())).await;

        state
            .store
            .write_snapshot("variants", &json!({"time": {"discovery": [{"text": "Hola {name}"}]}}))
            .await
            .unwrap();
        assert_eq!(state.reload_variants().await.unwrap(), 1);
        assert!(state.assistant.variants().is_loaded());

        std::fs::write(dir.path().join("variants.json"), "{not json").unwrap();
        assert_eq!(state.reload_variants().await.unwrap(), 0);
        assert!(!state.assistant.variants().is_loaded());
    }

    #[tokio::test]
    async fn test_from_settings_with_empty_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.storage.data_dir = dir.path().to_path_buf();

        let state = AppState::from_settings(settings, None).await;
        assert!(!state.assistant.variants().is_loaded());
        assert!(state.assistant.generator().is_none());
        assert_eq!(state.variants_path(), dir.path().join("variants.json"));
    }
}
