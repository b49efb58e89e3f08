//! Default values for configuration fields

/// Environment variable overriding `signing.secret`
pub const ENV_SIGNING_SECRET: &str = "DISKFILE_SIGNING_SECRET";

pub fn tcp_nodelay() -> bool {
    true
}

pub fn timeout_secs() -> u64 {
    60
}

pub fn max_concurrent_requests() -> usize {
    1000
}

pub fn allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

pub fn enable_compression() -> bool {
    false  // Compressed bodies drop Content-Length on streamed files
}

// Storage defaults
pub fn default_disk() -> String {
    "local".to_string()
}

pub fn local_root() -> String {
    "storage/app".to_string()
}

pub fn storage_settings() -> super::models::StorageSettings {
    let mut disks = std::collections::BTreeMap::new();
    disks.insert(
        default_disk(),
        super::models::DiskConfig::Local(super::models::LocalDiskSettings {
            root: local_root(),
            public_url: String::new(),
        }),
    );

    super::models::StorageSettings {
        default_disk: default_disk(),
        cloud_disk: default_disk(),
        disks,
    }
}

pub fn s3_region() -> String {
    "auto".to_string()
}

// Signing defaults
pub fn default_expiration_secs() -> u64 {
    3600
}

pub fn signing_settings() -> super::models::SigningSettings {
    super::models::SigningSettings {
        secret: String::new(),
        default_expiration_secs: default_expiration_secs(),
    }
}

// Temp defaults
pub fn temp_directory() -> String {
    std::env::temp_dir()
        .join("diskfile")
        .to_string_lossy()
        .to_string()
}

pub fn temp_max_age_hours() -> u64 {
    24
}

pub fn temp_sweep_interval_secs() -> u64 {
    3600
}

pub fn temp_settings() -> super::models::TempSettings {
    super::models::TempSettings {
        directory: temp_directory(),
        max_age_hours: temp_max_age_hours(),
        sweep_interval_secs: temp_sweep_interval_secs(),
    }
}

/// Fresh random signing secret for newly created config files
pub fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// `{secret}` is substituted when the file is written
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# diskfile Configuration
# ===============================================================================

[server]
# Network
host = "0.0.0.0"                     # Server bind address (0.0.0.0 = all interfaces)
port = 8080                          # Server port
base_url = "http://localhost:8080"   # Public base URL used in signed links

# Performance
tcp_nodelay = true                   # Disable Nagle's algorithm (lower latency)
timeout_secs = 60                    # Request timeout in seconds
max_concurrent_requests = 1000       # Max simultaneous connections
enable_compression = false           # HTTP compression (drops Content-Length on streams)

# CORS
allowed_origins = ["*"]              # "*" = all origins | ["https://example.com"] for production

# ===============================================================================
# STORAGE DISKS
# ===============================================================================
[storage]
default = "local"                    # Disk used when code asks for "default"
cloud = "local"                      # Disk used when code asks for "cloud"

[storage.disks.local]
driver = "local"                     # local | memory | s3
root = "storage/app"                 # Directory the disk is rooted at
public_url = ""                      # Public URL serving this directory (optional)

#[storage.disks.s3]
#driver = "s3"
#endpoint_url = ""                   # S3 endpoint (e.g., https://s3.amazonaws.com)
#region = "auto"                     # S3 region (e.g., us-east-1 or "auto")
#access_key_id = ""                  # AWS Access Key ID
#secret_access_key = ""              # AWS Secret Access Key
#bucket_name = "diskfile"            # S3 bucket name
#public_url = ""                     # Public URL for file downloads (optional)
#bucket_prefix = ""                  # Prefix for all S3 keys (optional)

# ===============================================================================
# SIGNED URLS
# ===============================================================================
[signing]
secret = "{secret}"                  # HMAC key (override with DISKFILE_SIGNING_SECRET)
default_expiration_secs = 3600       # Lifetime of signed links (0 = never expire)

# ===============================================================================
# TEMP FILES
# ===============================================================================
[temp]
#directory = "/tmp/diskfile"         # Scratch root (defaults to <system temp>/diskfile)
max_age_hours = 24                   # Temp files older than this are swept
sweep_interval_secs = 3600           # Sweep interval in seconds (0 = disabled)
"#;
