//! Variant Store
//!
//! In-memory cache of reply templates keyed by `(intent, stage)`. The
//! snapshot shape is
//!
//! ```json
//! { "time": { "discovery": [ { "text": "Hola {name}, ...", "weight": 2 } ] },
//!   "default": { "discovery": [ ... ] } }
//! ```
//!
//! The whole table is swapped atomically on reload, so a selection running
//! concurrently always sees either the old or the new table.
//!
//! Resolution order for `select(intent, stage, name)`:
//! 1. the exact `(intent, stage)` block
//! 2. the `("default", stage)` block
//! 3. the built-in objection-handling block
//! 4. the built-in greeting

use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sales_assist_config::AssistantConfig;
use sales_assist_core::{Intent, SalesStage};

/// Intent key of the per-stage fallback blocks
pub const DEFAULT_INTENT_KEY: &str = "default";

/// Last-resort template when every block is empty
pub const BUILTIN_GREETING: &str = "Hola {name}, ¿en qué te puedo ayudar hoy?";

/// Built-in objection-handling block used when the snapshot has no match
const BUILTIN_OBJECTION_BLOCK: &[(&str, f64)] = &[
    (
        "Entiendo, {name}. Justamente por eso armamos una ruta flexible que se adapta a tu ritmo. ¿Te cuento cómo funciona?",
        1.0,
    ),
    (
        "Tiene sentido lo que dices, {name}. Muchas personas empezaron con la misma duda. ¿Quieres que te muestre el plan paso a paso?",
        1.0,
    ),
];

fn default_weight() -> f64 {
    1.0
}

/// One candidate reply template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub text: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Variant {
    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }

    /// Weight used for sampling; non-positive or non-finite weights count as 1
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            1.0
        }
    }
}

/// Parsed variant snapshot: intent key -> stage key -> block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantTable {
    blocks: HashMap<String, HashMap<String, Vec<Variant>>>,
}

impl VariantTable {
    /// Parse a snapshot value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Non-empty block for the given keys
    pub fn block(&self, intent: &str, stage: &str) -> Option<&[Variant]> {
        self.blocks
            .get(intent)
            .and_then(|stages| stages.get(stage))
            .map(Vec::as_slice)
            .filter(|block| !block.is_empty())
    }

    pub fn insert(&mut self, intent: &str, stage: &str, block: Vec<Variant>) {
        self.blocks
            .entry(intent.to_string())
            .or_default()
            .insert(stage.to_string(), block);
    }

    pub fn is_empty(&self) -> bool {
        self.block_count() == 0
    }

    /// Number of non-empty blocks
    pub fn block_count(&self) -> usize {
        self.blocks
            .values()
            .flat_map(|stages| stages.values())
            .filter(|block| !block.is_empty())
            .count()
    }
}

/// Which step of the fallback chain produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Exact,
    DefaultIntent,
    BuiltinObjection,
    BuiltinGreeting,
}

/// Loaded block counts for the admin surface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantSummary {
    pub blocks: usize,
    pub variants: usize,
    /// intent key -> number of non-empty stage blocks
    pub intents: BTreeMap<String, usize>,
}

/// Variant Store
pub struct VariantStore {
    table: RwLock<Arc<VariantTable>>,
    fallback_block: Vec<Variant>,
    placeholder: String,
    default_name: String,
}

impl VariantStore {
    /// Create an empty store
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            table: RwLock::new(Arc::new(VariantTable::default())),
            fallback_block: BUILTIN_OBJECTION_BLOCK
                .iter()
                .map(|(text, weight)| Variant::new(*text, *weight))
                .collect(),
            placeholder: config.name_placeholder.clone(),
            default_name: config.default_customer_name.clone(),
        }
    }

    /// Replace the built-in objection-handling block
    pub fn with_fallback_block(mut self, block: Vec<Variant>) -> Self {
        self.fallback_block = block;
        self
    }

    /// Replace the whole table from a snapshot
    ///
    /// A malformed snapshot leaves an empty table in place. Returns the
    /// number of non-empty blocks loaded.
    pub fn load(&self, snapshot: Value) -> usize {
        let table = match VariantTable::from_value(snapshot) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "Variant snapshot malformed, using empty table");
                VariantTable::default()
            }
        };
        self.load_table(table)
    }

    /// Replace the whole table
    pub fn load_table(&self, table: VariantTable) -> usize {
        let blocks = table.block_count();
        *self.table.write() = Arc::new(table);
        tracing::info!(blocks, "Variant table loaded");
        blocks
    }

    /// Current table
    pub fn table(&self) -> Arc<VariantTable> {
        self.table.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        !self.table.read().is_empty()
    }

    /// Resolve the candidate block through the fallback chain
    pub fn resolve(&self, intent: Intent, stage: SalesStage) -> (Resolution, Vec<Variant>) {
        let table = self.table();

        if let Some(block) = table.block(intent.as_str(), stage.as_str()) {
            return (Resolution::Exact, block.to_vec());
        }
        if let Some(block) = table.block(DEFAULT_INTENT_KEY, stage.as_str()) {
            return (Resolution::DefaultIntent, block.to_vec());
        }
        if !self.fallback_block.is_empty() {
            return (Resolution::BuiltinObjection, self.fallback_block.clone());
        }
        (
            Resolution::BuiltinGreeting,
            vec![Variant::new(BUILTIN_GREETING, 1.0)],
        )
    }

    /// Pick a reply for the keys and fill in the customer name
    pub fn select(&self, intent: Intent, stage: SalesStage, name: Option<&str>) -> String {
        self.select_with_rng(intent, stage, name, &mut rand::thread_rng())
    }

    /// `select` with a caller-supplied random source
    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        intent: Intent,
        stage: SalesStage,
        name: Option<&str>,
        rng: &mut R,
    ) -> String {
        let (resolution, block) = self.resolve(intent, stage);
        tracing::debug!(
            intent = %intent,
            stage = %stage,
            resolution = ?resolution,
            candidates = block.len(),
            "Variant block resolved"
        );

        let template = pick_weighted(&block, rng)
            .map(|variant| variant.text.as_str())
            .unwrap_or(BUILTIN_GREETING);
        self.render(template, name)
    }

    /// Substitute every placeholder occurrence with the name or the default label
    pub fn render(&self, template: &str, name: Option<&str>) -> String {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.default_name.as_str());
        template.replace(&self.placeholder, name)
    }

    /// Block counts per intent
    pub fn summary(&self) -> VariantSummary {
        let table = self.table();
        let mut summary = VariantSummary::default();

        for (intent, stages) in &table.blocks {
            let non_empty: Vec<&Vec<Variant>> =
                stages.values().filter(|block| !block.is_empty()).collect();
            if non_empty.is_empty() {
                continue;
            }
            summary.blocks += non_empty.len();
            summary.variants += non_empty.iter().map(|block| block.len()).sum::<usize>();
            summary.intents.insert(intent.clone(), non_empty.len());
        }

        summary
    }
}

/// Weighted random pick
///
/// Draws `r` uniformly in `[0, total)` and subtracts weights in list order
/// until the remainder is `<= 0`. Each weight is capped at `f64::MAX / len`
/// so the total stays finite.
pub fn pick_weighted<'a, R: Rng + ?Sized>(variants: &'a [Variant], rng: &mut R) -> Option<&'a Variant> {
    if variants.is_empty() {
        return None;
    }

    let cap = f64::MAX / variants.len() as f64;
    let weight = |variant: &Variant| variant.effective_weight().min(cap);
    let total: f64 = variants.iter().map(weight).sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let mut remaining = rng.gen_range(0.0..total);
    for variant in variants {
        remaining -= weight(variant);
        if remaining <= 0.0 {
            return Some(variant);
        }
    }
    variants.last()
}
