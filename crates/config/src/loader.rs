use super::defaults::{generate_secret, DEFAULT_CONFIG_TEMPLATE, ENV_SIGNING_SECRET};
use super::migration::migrate_config_if_needed;
use super::models::Config;
use std::path::Path;
use std::sync::Arc;

impl Config {
    /// Loads configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::from_file_with_events(path, None).await
    }

    /// Loads configuration from a file with optional event bus for notifications
    pub async fn from_file_with_events<P: AsRef<Path>>(
        path: P,
        events: Option<&Arc<diskfile_events::EventBus>>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();

        // Create default config if it doesn't exist
        if !path.exists() {
            create_default_config(path).await?;
        }

        // Migrate config if needed
        migrate_config_if_needed(path, events).await?;

        // Read and parse config
        let content = tokio::fs::read_to_string(path).await?;
        let mut config = Self::from_toml_str(&content)?;

        if let Ok(secret) = std::env::var(ENV_SIGNING_SECRET) {
            if !secret.is_empty() {
                tracing::debug!("Signing secret taken from {}", ENV_SIGNING_SECRET);
                config.signing.secret = secret;
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Parses configuration text without validating it
    pub fn from_toml_str(content: &str) -> Result<Self, super::ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Creates a default configuration file with a fresh signing secret
async fn create_default_config<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let content = DEFAULT_CONFIG_TEMPLATE.replace("{secret}", &generate_secret());
    tokio::fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_created_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::from_file(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.default_disk, "local");
        assert_eq!(config.storage.cloud_disk, "local");
        assert_eq!(config.storage.disks["local"].driver(), "local");
        assert_eq!(config.signing.secret.len(), 64);
        assert_eq!(config.temp.max_age_hours, 24);
    }

    #[tokio::test]
    async fn test_existing_file_keeps_its_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let first = Config::from_file(&path).await.unwrap();
        let second = Config::from_file(&path).await.unwrap();

        assert_eq!(first.signing.secret, second.signing.secret);
    }
}
