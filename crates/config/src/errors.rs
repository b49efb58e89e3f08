use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Disk name '{0}' is reserved")]
    ReservedDisk(String),

    #[error("Unknown disk '{disk}' referenced by storage.{field}")]
    UnknownDisk { field: String, disk: String },

    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
}
