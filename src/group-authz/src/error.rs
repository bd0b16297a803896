//! Error types for the group-membership policy engine

use thiserror::Error;

/// Group-membership engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Policy configuration cannot be used (malformed pattern, unknown match target)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Policy not found
    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Group directory lookup failed
    #[error("Group directory error: {0}")]
    Directory(String),

    /// Resource store lookup failed
    #[error("Resource store error: {0}")]
    ResourceStore(String),

    /// Policy configuration store lookup failed
    #[error("Policy store error: {0}")]
    PolicyStore(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Engine configuration could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AuthzError {
    /// Whether the error comes from the policy author rather than a collaborator
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Toml(_))
    }
}

/// Result type for group-membership operations
pub type Result<T> = std::result::Result<T, AuthzError>;
