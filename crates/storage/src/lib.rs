mod backend;
mod local;
mod memory;
mod registry;
mod errors;
#[cfg_attr(not(feature = "s3"), allow(dead_code))]
mod object;

#[cfg(feature = "s3")]
mod s3;

pub use backend::{ByteStream, StorageBackend};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use registry::DiskRegistry;
pub use errors::*;

#[cfg(feature = "s3")]
pub use s3::S3Backend;
