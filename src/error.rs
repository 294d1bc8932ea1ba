//! Unified error handling for the lodgeo crate
//!
//! Domain errors ([`LookupError`], [`CacheError`]) stay usable on their own;
//! [`Error`] wraps them at module boundaries.
//!
//! # Architecture
//!
//! - [`LodErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust
//! use lodgeo::error::{Error, LodErrorTrait};
//! use lodgeo::lookup::LookupError;
//!
//! let err = Error::from(LookupError::Status(503));
//! if err.is_recoverable() {
//!     println!("Retry later: {}", err.user_message());
//! }
//! ```

use thiserror::Error;

pub use crate::cache::CacheError;
pub use crate::lookup::LookupError;

/// Common trait for all lodgeo error types
pub trait LodErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Generic description safe to show to end users
    fn user_message(&self) -> String {
        self.category().description().to_string()
    }

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, status, client timeout)
    Network,
    /// Endpoint answered with something that is not a SPARQL result
    Parsing,
    /// Cache snapshots and other file I/O
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// User-facing description of the category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "The data service could not be reached",
            Self::Parsing => "The data service returned an unexpected response",
            Self::Storage => "Local cache storage failed",
            Self::Config => "Invalid configuration",
            Self::Other => "Unexpected error",
        }
    }
}

impl LodErrorTrait for LookupError {
    fn is_recoverable(&self) -> bool {
        self.is_transient()
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::Status(_) => ErrorCategory::Network,
            Self::Decode(_) => ErrorCategory::Parsing,
            Self::InvalidUrl(_) | Self::InvalidHeader(_) => ErrorCategory::Config,
        }
    }
}

impl LodErrorTrait for CacheError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Serialize { .. } => ErrorCategory::Other,
            Self::Io { .. } | Self::InvalidSnapshot { .. } => ErrorCategory::Storage,
        }
    }
}

/// Unified error type for the lodgeo crate
#[derive(Error, Debug)]
pub enum Error {
    /// SPARQL lookup errors
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl LodErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Lookup(e) => e.is_recoverable(),
            Self::Cache(e) => e.is_recoverable(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Lookup(e) => e.user_message(),
            Self::Cache(e) => e.user_message(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Lookup(e) => e.category(),
            Self::Cache(e) => e.category(),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
