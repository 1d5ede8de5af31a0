use thiserror::Error;

/// The main error type for pm-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Environment variable error
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Serialization/Deserialization error
  #[error("Serialization error")]
  Serde(#[from] serde_json::Error),

  /// Date/Time parsing error
  #[error("Date parsing error")]
  ParseDate(#[from] chrono::ParseError),

  /// Missing required field in response
  #[error("Missing required field: {0}")]
  MissingField(String),

  /// Invalid response from an upstream service
  #[error("Invalid response: {0}")]
  InvalidResponse(String),

  /// HTTP transport error
  #[error("HTTP error: {0}")]
  Http(String),

  /// General unexpected error
  #[error("Unexpected error: {0}")]
  Unexpected(String),
}

/// Result type alias for pm-* crates
pub type Result<T> = std::result::Result<T, Error>;
