mod canonical;
mod errors;
mod models;
mod signer;

pub use errors::SigningError;
pub use models::{SignedRequest, UrlSigner};
