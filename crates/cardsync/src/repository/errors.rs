use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during card store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Card not found.
    #[error("Card not found: {context}")]
    NotFound { context: String },

    /// Record failed field validation.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepositoryError {
    /// Create a NotFound error for an external id lookup.
    pub fn not_found_by_external_id(external_id: &str) -> Self {
        Self::NotFound {
            context: format!("external_id={}", external_id),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
