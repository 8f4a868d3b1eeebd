//! Configuration file watcher for hot reload.

use std::path::Path;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ProxyConfig;

/// Watch a config file, publishing validated reloads on `update_tx`.
///
/// Files that fail to parse or validate are logged and skipped; the
/// running configuration stays in effect. The returned watcher must be
/// kept alive for as long as reloads should be delivered.
pub fn watch(
    path: &Path,
    update_tx: mpsc::UnboundedSender<ProxyConfig>,
) -> Result<RecommendedWatcher, notify::Error> {
    let watched = path.to_path_buf();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.kind.is_modify() || event.kind.is_create() {
                    tracing::info!("Config file change detected, reloading...");
                    match load_config(&watched) {
                        Ok(new_config) => {
                            let _ = update_tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;

    tracing::info!(path = ?path, "Config watcher started");
    Ok(watcher)
}
