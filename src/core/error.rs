use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArenaError {
    /// Construction-time invariant violated (negative cost, duplicate key, bad config)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reasoning service failed, or returned something unusable
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ArenaError {
    /// Is this a reasoning-service failure (absorbable during a turn)?
    pub fn is_generation(&self) -> bool {
        matches!(self, ArenaError::Generation(_))
    }
}

pub type Result<T> = std::result::Result<T, ArenaError>;
