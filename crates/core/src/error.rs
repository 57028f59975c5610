#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid structure payload: {0}")]
    InvalidPayload(String),
    #[error("failed to serialize: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;
