//! # Validation Errors
//!
//! Raised by the validating constructors in [`crate::identity`]. Each
//! variant names the offending field.

use thiserror::Error;

/// An identifier failed validation at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty after trimming.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the field.
        field: &'static str,
    },

    /// A field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters, got {actual}")]
    TooLong {
        /// Name of the field.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// A field contained characters outside its allowed alphabet.
    #[error("{field} must be ASCII alphanumeric, got {value:?}")]
    NotAlphanumeric {
        /// Name of the field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}
