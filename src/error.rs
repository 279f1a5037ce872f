//! Error types for contract valuation

use thiserror::Error;

/// Errors surfaced by the valuation engine
///
/// All variants are caller errors: the engine does no I/O of its own apart
/// from the CSV/JSON loaders, so nothing here is retryable.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// A contract structure violated one of its construction invariants
    #[error("invalid contract field `{field}`: {reason}")]
    InvalidContract { field: &'static str, reason: String },

    /// A simulation or discounting parameter was out of range
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// Incentive allocator input was unusable
    #[error("invalid usage input `{field}`: {reason}")]
    InvalidUsage { field: &'static str, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A loaded row could not be interpreted
    #[error("row {row}: {reason}")]
    Parse { row: usize, reason: String },
}

impl ValuationError {
    pub(crate) fn contract(field: &'static str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidContract { field, reason: reason.into() }
    }

    pub(crate) fn parameter(field: &'static str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidParameter { field, reason: reason.into() }
    }

    pub(crate) fn usage(field: &'static str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidUsage { field, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ValuationError>;
