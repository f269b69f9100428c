//! Reply statistics
//!
//! Counts how often each reply was shown and how it was rated, keyed by
//! `(intent, stage, signature)`. The in-memory table is authoritative and
//! is loaded once from the store; every mutation is written back as a whole
//! snapshot while the table lock is still held, so concurrent
//! `record_shown`/`record_rating` calls never lose updates.
//!
//! A failed write leaves the in-memory update in place and is reported to
//! the caller, who logs it and carries on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use sales_assist_core::{Intent, Rating, SalesStage};
use sales_assist_text_processing::text_signature;

use crate::{PersistenceError, SnapshotStore};

/// Counters for one reply signature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsEntry {
    #[serde(default)]
    pub shown_count: u64,
    #[serde(default)]
    pub win_score: f64,
    #[serde(default)]
    pub good_count: u64,
    #[serde(default)]
    pub regular_count: u64,
    #[serde(default)]
    pub bad_count: u64,
    #[serde(default)]
    pub last_seen_text: String,
}

impl StatsEntry {
    fn observe_text(&mut self, text: &str) {
        if text.chars().count() > self.last_seen_text.chars().count() {
            self.last_seen_text = text.to_string();
        }
    }

    fn record_shown(&mut self, text: &str) {
        self.shown_count += 1;
        self.observe_text(text);
    }

    fn record_rating(&mut self, text: &str, rating: Rating) {
        self.observe_text(text);
        if self.shown_count == 0 {
            self.shown_count = 1;
        }
        match rating {
            Rating::Good => self.good_count += 1,
            Rating::Regular => self.regular_count += 1,
            Rating::Bad => self.bad_count += 1,
        }
        self.win_score += rating.win_value();
    }

    /// Wins over shown, 0 when never shown
    pub fn winrate(&self) -> f64 {
        if self.shown_count == 0 {
            0.0
        } else {
            self.win_score / self.shown_count as f64
        }
    }
}

/// intent -> stage -> signature -> entry
pub type StatsTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, StatsEntry>>>;

/// One dashboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    pub intent: String,
    pub stage: String,
    pub text: String,
    pub shown: u64,
    pub wins: f64,
    pub winrate: f64,
    pub good: u64,
    pub regular: u64,
    pub bad: u64,
}

/// Statistics aggregator over a snapshot store
pub struct StatsAggregator {
    store: Arc<dyn SnapshotStore>,
    snapshot: String,
    signature_max_chars: usize,
    table: Mutex<StatsTable>,
}

impl StatsAggregator {
    /// Load the aggregator; a missing or corrupt snapshot starts empty
    pub async fn load(
        store: Arc<dyn SnapshotStore>,
        snapshot: impl Into<String>,
        signature_max_chars: usize,
    ) -> Self {
        let snapshot = snapshot.into();
        let table = match store.read_snapshot(&snapshot).await {
            Ok(Some(value)) => match serde_json::from_value::<StatsTable>(value) {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!(snapshot = %snapshot, error = %e, "Stats snapshot malformed, starting empty");
                    StatsTable::new()
                }
            },
            Ok(None) => StatsTable::new(),
            Err(e) => {
                tracing::warn!(snapshot = %snapshot, error = %e, "Failed to read stats snapshot, starting empty");
                StatsTable::new()
            }
        };

        tracing::info!(
            snapshot = %snapshot,
            signatures = table.values().flat_map(|s| s.values()).map(|m| m.len()).sum::<usize>(),
            "Stats loaded"
        );

        Self {
            store,
            snapshot,
            signature_max_chars,
            table: Mutex::new(table),
        }
    }

    /// Record that a reply was shown
    pub async fn record_shown(
        &self,
        intent: Intent,
        stage: SalesStage,
        text: &str,
    ) -> Result<(), PersistenceError> {
        let signature = text_signature(text, self.signature_max_chars);
        let mut table = self.table.lock().await;
        entry_mut(&mut table, intent, stage, signature).record_shown(text);
        self.persist(&table).await
    }

    /// Record a customer rating for a reply
    pub async fn record_rating(
        &self,
        intent: Intent,
        stage: SalesStage,
        text: &str,
        rating: Rating,
    ) -> Result<(), PersistenceError> {
        let signature = text_signature(text, self.signature_max_chars);
        let mut table = self.table.lock().await;
        entry_mut(&mut table, intent, stage, signature).record_rating(text, rating);
        self.persist(&table).await
    }

    /// Dashboard rows sorted by winrate, then shown count
    ///
    /// Rows start in key order (intent, stage, signature) and the sort is
    /// stable, so equal rows keep that order.
    pub async fn compute_rows(&self) -> Vec<StatsRow> {
        let table = self.table.lock().await;
        let mut rows: Vec<StatsRow> = table
            .iter()
            .flat_map(|(intent, stages)| {
                stages.iter().flat_map(move |(stage, signatures)| {
                    signatures.values().map(move |entry| StatsRow {
                        intent: intent.clone(),
                        stage: stage.clone(),
                        text: entry.last_seen_text.clone(),
                        shown: entry.shown_count,
                        wins: entry.win_score,
                        winrate: entry.winrate(),
                        good: entry.good_count,
                        regular: entry.regular_count,
                        bad: entry.bad_count,
                    })
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.winrate
                .total_cmp(&a.winrate)
                .then_with(|| b.shown.cmp(&a.shown))
        });
        rows
    }

    /// Look up a single entry
    pub async fn entry(&self, intent: Intent, stage: SalesStage, text: &str) -> Option<StatsEntry> {
        let signature = text_signature(text, self.signature_max_chars);
        let table = self.table.lock().await;
        table
            .get(intent.as_str())
            .and_then(|stages| stages.get(stage.as_str()))
            .and_then(|signatures| signatures.get(&signature))
            .cloned()
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    async fn persist(&self, table: &StatsTable) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(table)?;
        self.store.write_snapshot(&self.snapshot, &value).await
    }
}

fn entry_mut(
    table: &mut StatsTable,
    intent: Intent,
    stage: SalesStage,
    signature: String,
) -> &mut StatsEntry {
    table
        .entry(intent.as_str().to_string())
        .or_default()
        .entry(stage.as_str().to_string())
        .or_default()
        .entry(signature)
        .or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    async fn aggregator() -> StatsAggregator {
        StatsAggregator::load(Arc::new(InMemoryStore::new()), "stats", 160).await
    }

    #[tokio::test]
    async fn test_shown_then_good() {
        let stats = aggregator().await;
        let text = "Hola Ana, ¿te cuento la ruta?";

        stats.record_shown(Intent::Time, SalesStage::Discovery, text).await.unwrap();
        stats
            .record_rating(Intent::Time, SalesStage::Discovery, text, Rating::Good)
            .await
            .unwrap();

        let rows = stats.compute_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shown, 1);
        assert_eq!(rows[0].good, 1);
        assert_eq!(rows[0].wins, 1.0);
        assert_eq!(rows[0].winrate, 1.0);
    }

    #[tokio::test]
    async fn test_rating_bootstraps_shown() {
        let stats = aggregator().await;
        stats
            .record_rating(Intent::Price, SalesStage::Close, "Texto nunca mostrado", Rating::Bad)
            .await
            .unwrap();

        let rows = stats.compute_rows().await;
        assert_eq!(rows[0].shown, 1);
        assert_eq!(rows[0].bad, 1);
        assert_eq!(rows[0].wins, 0.0);
        assert_eq!(rows[0].winrate, 0.0);
    }

    #[tokio::test]
    async fn test_signature_merges_variants() {
        let stats = aggregator().await;
        stats
            .record_shown(Intent::Pitch, SalesStage::Integration, "Hola Ana te cuento")
            .await
            .unwrap();
        stats
            .record_shown(Intent::Pitch, SalesStage::Integration, "Hola Ana, ¡te cuento!")
            .await
            .unwrap();

        let entry = stats
            .entry(Intent::Pitch, SalesStage::Integration, "hola ana te cuento")
            .await
            .unwrap();
        assert_eq!(entry.shown_count, 2);
        // longer text wins
        assert_eq!(entry.last_seen_text, "Hola Ana, ¡te cuento!");
    }

    #[tokio::test]
    async fn test_win_score_invariant() {
        let stats = aggregator().await;
        let text = "Una respuesta";
        for rating in [Rating::Good, Rating::Regular, Rating::Regular, Rating::Bad, Rating::Good] {
            stats
                .record_rating(Intent::General, SalesStage::PreClose, text, rating)
                .await
                .unwrap();
        }

        let entry = stats
            .entry(Intent::General, SalesStage::PreClose, text)
            .await
            .unwrap();
        let expected = entry.good_count as f64 + 0.5 * entry.regular_count as f64;
        assert_eq!(entry.win_score, expected);
        assert_eq!(entry.win_score, 3.0);
        assert!(entry.shown_count >= 1);
    }

    #[tokio::test]
    async fn test_rows_sorted_by_winrate_then_shown() {
        let stats = aggregator().await;
        let stage = SalesStage::Discovery;

        // a: shown 2, 1 good -> 0.5
        stats.record_shown(Intent::Time, stage, "a").await.unwrap();
        stats.record_shown(Intent::Time, stage, "a").await.unwrap();
        stats.record_rating(Intent::Time, stage, "a", Rating::Good).await.unwrap();
        // b: shown 1, 1 good -> 1.0
        stats.record_shown(Intent::Time, stage, "b").await.unwrap();
        stats.record_rating(Intent::Time, stage, "b", Rating::Good).await.unwrap();
        // c: shown 4, 2 good -> 0.5
        for _ in 0..4 {
            stats.record_shown(Intent::Price, stage, "c").await.unwrap();
        }
        stats.record_rating(Intent::Price, stage, "c", Rating::Good).await.unwrap();
        stats.record_rating(Intent::Price, stage, "c", Rating::Good).await.unwrap();

        let texts: Vec<String> = stats.compute_rows().await.into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_concurrent_updates_not_lost() {
        let stats = Arc::new(aggregator().await);
        let mut handles = Vec::new();
        for _ in 0..50 {
            let stats = stats.clone();
            handles.push(tokio::spawn(async move {
                stats
                    .record_shown(Intent::Time, SalesStage::Discovery, "misma respuesta")
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let rows = stats.compute_rows().await;
        assert_eq!(rows[0].shown, 50);
    }

    #[tokio::test]
    async fn test_persisted_and_reloaded() {
        let store: Arc<dyn SnapshotStore> = Arc::new(InMemoryStore::new());
        let stats = StatsAggregator::load(store.clone(), "stats", 160).await;
        stats
            .record_rating(Intent::Competitor, SalesStage::Close, "Texto", Rating::Regular)
            .await
            .unwrap();

        let reloaded = StatsAggregator::load(store, "stats", 160).await;
        let rows = reloaded.compute_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].intent, "competitor");
        assert_eq!(rows[0].stage, "close");
        assert_eq!(rows[0].wins, 0.5);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let store = InMemoryStore::new().with_snapshot("stats", json!(["not", "a", "table"]));
        let stats = StatsAggregator::load(Arc::new(store), "stats", 160).await;
        assert!(stats.compute_rows().await.is_empty());
    }

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn read_snapshot(&self, name: &str) -> Result<Option<Value>, PersistenceError> {
            Err(PersistenceError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
            ))
        }

        async fn write_snapshot(&self, name: &str, _value: &Value) -> Result<(), PersistenceError> {
            Err(PersistenceError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
            ))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_update() {
        let stats = StatsAggregator::load(Arc::new(FailingStore), "stats", 160).await;
        let result = stats.record_shown(Intent::Time, SalesStage::Discovery, "Hola").await;
        assert!(result.is_err());

        let rows = stats.compute_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shown, 1);
    }
}
