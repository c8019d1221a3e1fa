//! Error types for `watchpost-auth`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The digest could not be computed.
  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
