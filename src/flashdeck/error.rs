use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlashdeckError {
    #[error("Set not found: {0}")]
    SetNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Card generation failed: {0}")]
    Generation(String),

    #[error("No generation credential configured (set one with `flashdeck key`)")]
    MissingCredential,

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, FlashdeckError>;
