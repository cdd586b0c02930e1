use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid outline: {0}")]
    Outline(String),
}

impl From<serde_json::Error> for BlockError {
    fn from(error: serde_json::Error) -> Self {
        BlockError::Outline(error.to_string())
    }
}
