use super::models::{AppEvent, EventBus};
use std::sync::Arc;
use colored::Colorize;

impl EventBus {
    pub fn new(silent_mode: bool) -> Arc<Self> {
        Arc::new(Self { silent_mode })
    }

    pub fn emit(&self, event: AppEvent) {
        match event {
            // Application lifecycle
            AppEvent::Starting => {
                println!("\n{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
                println!("  {}", "diskfile - File Delivery Server".white().bold());
                println!("  {} {}", "Version".dimmed(), env!("CARGO_PKG_VERSION").cyan());
                println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
            }
            AppEvent::Ready { addr, base_url } => {
                println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".green());
                println!("  {} {}", "Server".white(), addr.cyan());
                println!("  {} {}", "URL   ".white(), base_url.blue());
                println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".green());
            }
            AppEvent::Shutdown => {
                println!("\n{}", "Server shutting down".red());
            }

            // Configuration
            AppEvent::ConfigLoading { path } => {
                println!("  {} {}", "Loading config".dimmed(), path.cyan());
            }
            AppEvent::ConfigLoaded { disks_count } => {
                if disks_count == 0 {
                    println!("  {} No disks configured", "⚠".yellow());
                } else {
                    println!("  {} {} disk(s)", "✓".green(), disks_count.to_string().cyan());
                }
            }
            AppEvent::ConfigCreated { path } => {
                tracing::warn!("Configuration file not found");
                tracing::info!("Created default configuration at: {}", path);
            }
            AppEvent::ConfigMigrated { added_fields } => {
                if !added_fields.is_empty() {
                    println!("  {} Config updated: added {}",
                        "↻".blue(),
                        added_fields.join(", ").dimmed()
                    );
                }
            }
            AppEvent::ConfigError { error } => {
                tracing::error!("Configuration error: {}", error);
            }

            // Storage
            AppEvent::DisksInitialized { disks, default_disk, cloud_disk } => {
                println!("  {} Disks {}", "✓".green(), disks.join(", ").cyan());
                println!("  {} default={} cloud={}",
                    "→".dimmed(),
                    default_disk.cyan(),
                    cloud_disk.cyan()
                );
            }
            AppEvent::TempRootReady { path } => {
                tracing::debug!("Temp root ready at {}", path);
            }

            // Temp sweep
            AppEvent::TempSweepEnabled { interval, max_age_hours } => {
                println!("  {} Temp sweep every {}s (max age {}h)",
                    "↻".blue(),
                    interval.to_string().cyan(),
                    max_age_hours.to_string().cyan()
                );
            }
            AppEvent::TempSwept { removed } => {
                if removed > 0 {
                    tracing::info!("Temp sweep removed {} stale file(s)", removed);
                }
            }

            // Errors
            AppEvent::Error { context, error } => {
                tracing::error!("{}: {}", context, error);
            }
        }
    }
}
