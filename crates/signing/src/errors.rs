use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Invalid signature: {0}")]
    Invalid(String),

    #[error("Signature expired at {0}")]
    Expired(i64),
}
