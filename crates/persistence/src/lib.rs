//! Persistence layer for the sales assistant
//!
//! Provides storage for:
//! - Named JSON snapshots (variant table, reply statistics)
//! - Reply statistics aggregated by intent, stage and text signature

pub mod error;
pub mod snapshot;
pub mod stats;

pub use error::PersistenceError;
pub use snapshot::{InMemoryStore, JsonFileStore, SnapshotStore};
pub use stats::{StatsAggregator, StatsEntry, StatsRow, StatsTable};
