//! Error types for conversation operations.

/// Result type for conversation operations.
pub type Result<T> = std::result::Result<T, ConversationError>;

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    /// Configuration is present but invalid
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Registry(#[from] npc_registry::RegistryError),
}
