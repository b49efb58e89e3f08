use diskfile_config::Config;
use diskfile_events::{AppEvent, EventBus};
use diskfile_files::{FileManager, TempFactory};
use diskfile_filesystem::FileSystem;
use diskfile_signing::UrlSigner;
use diskfile_storage::DiskRegistry;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Builds the disks and the file manager every request goes through
pub async fn initialize_files(config: &Config, events: &Arc<EventBus>) -> Result<FileManager> {
    let registry = DiskRegistry::from_settings(&config.storage).await?;
    events.emit(AppEvent::DisksInitialized {
        disks: registry.names(),
        default_disk: registry.default_disk().to_string(),
        cloud_disk: registry.cloud_disk().to_string(),
    });

    let temp_root = FileSystem::ensure_temp_root(&config.temp.directory).await?;
    events.emit(AppEvent::TempRootReady {
        path: temp_root.display().to_string(),
    });

    let signer = UrlSigner::new(config.signing.secret.as_bytes(), &config.server.base_url)?;

    let default_expiration = match config.signing.default_expiration_secs {
        0 => None,
        secs => Some(chrono::Duration::seconds(i64::try_from(secs)?)),
    };

    Ok(FileManager::new(
        registry,
        signer,
        TempFactory::new(temp_root),
        default_expiration,
    ))
}

/// Periodically deletes stale temp files; `None` when the sweep is disabled
pub fn spawn_temp_sweep(
    config: &Config,
    temp_root: PathBuf,
    events: &Arc<EventBus>,
) -> Option<JoinHandle<()>> {
    let interval_secs = config.temp.sweep_interval_secs;
    if interval_secs == 0 {
        return None;
    }

    let max_age_hours = config.temp.max_age_hours;
    let max_age = Duration::from_secs(max_age_hours * 3600);
    events.emit(AppEvent::TempSweepEnabled {
        interval: interval_secs,
        max_age_hours,
    });

    let events = Arc::clone(events);
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match FileSystem::sweep_older_than(&temp_root, max_age).await {
                Ok(removed) => events.emit(AppEvent::TempSwept { removed }),
                Err(e) => events.emit(AppEvent::Error {
                    context: "temp sweep".to_string(),
                    error: e.to_string(),
                }),
            }
        }
    }))
}
