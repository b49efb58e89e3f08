use super::errors::ConfigError;
use super::models::Config;

/// Reserved for the filesystem-root disk registered by the storage layer
const RESERVED_DISK: &str = "root";

impl Config {
    /// Checks cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.disks.contains_key(RESERVED_DISK) {
            return Err(ConfigError::ReservedDisk(RESERVED_DISK.to_string()));
        }

        for (field, disk) in [
            ("default", &self.storage.default_disk),
            ("cloud", &self.storage.cloud_disk),
        ] {
            if disk != RESERVED_DISK && !self.storage.disks.contains_key(disk) {
                return Err(ConfigError::UnknownDisk {
                    field: field.to_string(),
                    disk: disk.clone(),
                });
            }
        }

        if self.signing.secret.trim().is_empty() {
            return Err(ConfigError::EmptyValue("signing.secret"));
        }

        if self.temp.directory.trim().is_empty() {
            return Err(ConfigError::EmptyValue("temp.directory"));
        }

        Ok(())
    }
}
