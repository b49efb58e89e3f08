mod models;
mod defaults;
mod loader;
mod migration;
mod validation;
mod errors;

pub use models::*;
pub use errors::ConfigError;
pub use defaults::ENV_SIGNING_SECRET;
