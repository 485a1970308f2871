//! Hot reload of the configuration file.
//!
//! The parent directory is watched rather than the file itself: editors and
//! config-management tools usually replace the file by rename, which drops a
//! watch placed on the old inode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ProxyConfig;

/// Reloads and re-validates the mirror configuration on change.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<ProxyConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end handed to `HttpServer::run`.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ProxyConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            updates,
        };
        (watcher, rx)
    }

    /// Start watching. Drop the returned handle to stop.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directory = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = self.path.clone();
        let updates = self.updates;

        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &path) => reload(&path, &updates),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        handle.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Watching configuration file");
        Ok(handle)
    }
}

fn reload(path: &Path, updates: &mpsc::UnboundedSender<ProxyConfig>) {
    match load_config(Some(path)) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Configuration file changed, reloading");
            if updates.send(config).is_err() {
                tracing::debug!("Server gone, dropping reloaded configuration");
            }
        }
        Err(e) => tracing::error!(error = %e, "Invalid configuration, keeping the running one"),
    }
}

/// Whether `event` creates or modifies the watched file.
fn touches(event: &Event, file: &Path) -> bool {
    let relevant_kind = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
    let Some(name) = file.file_name() else {
        return false;
    };
    relevant_kind && event.paths.iter().any(|p| p.file_name() == Some(name))
}
