// src/errors.rs
// DOCUMENTATION: Custom error types
// PURPOSE: Centralized error handling for entire application

use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
