//! Engine errors

use thiserror::Error;
use tonggwan_catalog::CatalogError;
use tonggwan_core::{DeclarationError, RecipientType, ShippingMethod};
use tonggwan_rates::RateError;
use tonggwan_rules::LibraryError;

/// Errors from the evaluation engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid declaration: {0}")]
    Validation(#[from] DeclarationError),

    #[error("Unknown currency: {code}")]
    UnknownCurrency { code: String },

    #[error("Unknown category: {id}")]
    UnknownCategory { id: String },

    #[error("No duty-free profile for {shipping_method}/{recipient_type}")]
    UnknownShippingProfile {
        shipping_method: ShippingMethod,
        recipient_type: RecipientType,
    },

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Snapshot rejected: {0}")]
    InvalidSnapshot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl From<RateError> for EngineError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::UnknownCurrency { code } => EngineError::UnknownCurrency { code },
            other => EngineError::Conversion(other.to_string()),
        }
    }
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownCategory { id } => EngineError::UnknownCategory { id },
            other => EngineError::InvalidSnapshot(other.to_string()),
        }
    }
}

impl From<LibraryError> for EngineError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Parse(e) => EngineError::SerdeError(e),
            other => EngineError::InvalidSnapshot(other.to_string()),
        }
    }
}
