//! Variant snapshot change notifier
//!
//! Watches the data directory and reloads the variant table when the
//! variants file is created, modified or replaced. Bursts of events inside
//! the debounce window trigger a single reload.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::state::AppState;

/// Whether a filesystem event touches the watched file
fn is_relevant(event: &Event, target: &Path) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matches
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == target.file_name())
}

/// Start watching the variants file
///
/// The returned watcher must be kept alive for notifications to flow.
pub fn spawn_variants_watcher(
    state: AppState,
    debounce: Duration,
) -> Result<RecommendedWatcher, notify::Error> {
    let target: PathBuf = state.variants_path();
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (tx, mut rx) = mpsc::channel::<()>(16);
    let filter_target = target.clone();

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
        Ok(event) if is_relevant(&event, &filter_target) => {
            // Full channel means a reload is already pending
            let _ = tx.try_send(());
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Variant watcher error"),
    })?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %target.display(), debounce_ms = debounce.as_millis() as u64, "Watching variant snapshot");

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            tokio::time::sleep(debounce).await;
            while rx.try_recv().is_ok() {}

            match state.reload_variants().await {
                Ok(blocks) => tracing::info!(blocks, "Variant table reloaded after file change"),
                Err(e) => tracing::warn!(error = %e, "Variant reload after file change failed, keeping current table"),
            }
        }
    });

    Ok(watcher)
}
