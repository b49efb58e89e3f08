use super::models::FileSystem;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

impl FileSystem {
    /// Deletes files under `root` whose last modification is at least `max_age` old,
    /// then prunes empty directories that are that old or were emptied by this pass.
    ///
    /// `root` itself is never removed. Returns the number of files deleted.
    pub async fn sweep_older_than(root: &Path, max_age: Duration) -> Result<usize> {
        let root = root.to_path_buf();
        let removed = tokio::task::spawn_blocking(move || sweep_blocking(&root, max_age)).await??;
        Ok(removed)
    }
}

fn sweep_blocking(root: &Path, max_age: Duration) -> Result<usize> {
    if !root.is_dir() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut removed = 0;
    // Deleting an entry bumps its parent's mtime, so parents emptied in this
    // pass are pruned without looking at their age
    let mut touched: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("temp sweep: skipping unreadable entry: {}", e);
                continue;
            }
        };

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("temp sweep: no metadata for {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or(Duration::ZERO);

        if metadata.is_dir() {
            if age < max_age && !touched.contains(entry.path()) {
                continue;
            }
            // Fails on non-empty directories, which is what we want
            if std::fs::remove_dir(entry.path()).is_ok() {
                tracing::debug!("temp sweep: pruned {}", entry.path().display());
                mark_parent(&mut touched, entry.path());
            }
            continue;
        }

        if age < max_age {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                removed += 1;
                tracing::debug!("temp sweep: removed {}", entry.path().display());
                mark_parent(&mut touched, entry.path());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("temp sweep: failed to remove {}: {}", entry.path().display(), e);
            }
        }
    }

    Ok(removed)
}

fn mark_parent(touched: &mut HashSet<PathBuf>, path: &Path) {
    if let Some(parent) = path.parent() {
        touched.insert(parent.to_path_buf());
    }
}
