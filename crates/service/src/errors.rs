use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn storage(e: impl std::fmt::Display) -> Self { Self::Storage(e.to_string()) }

    /// Whether the caller submitted something unacceptable, as opposed to a system failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Model(models::errors::ModelError::Validation(_))
        )
    }
}
