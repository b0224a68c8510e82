//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers the seal engine deals in. These
//! prevent identifier confusion at compile time: a `SectorId` cannot be
//! passed where a `ShipmentId` is expected.
//!
//! All constructors trim their input. `Prefix` and `SealCode` are also
//! upper-cased, so `"lacre"` and `" LACRE "` name the same sequence.
//! Deserialization runs the same validation as the constructors.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default number of digits a suffix is zero-padded to inside a code.
pub const DEFAULT_CODE_WIDTH: usize = 6;

const MAX_PREFIX_LEN: usize = 32;
const MAX_ID_LEN: usize = 64;

/// Trim and length-check a free-form identifier.
fn bounded(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: len,
        });
    }
    Ok(trimmed.to_string())
}

/// Trim, upper-case and check an alphanumeric identifier.
fn alphanumeric_upper(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let value = bounded(field, raw, max)?.to_ascii_uppercase();
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::NotAlphanumeric { field, value });
    }
    Ok(value)
}

macro_rules! string_newtype_impls {
    ($ty:ident) => {
        impl $ty {
            /// Borrow the validated value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

/// Code family a seal belongs to. Numbering is independent per prefix.
///
/// Upper-case ASCII alphanumeric, 1 to 32 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefix(String);

impl Prefix {
    /// Normalize and validate a prefix.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        alphanumeric_upper("prefix", raw, MAX_PREFIX_LEN).map(Self)
    }
}

string_newtype_impls!(Prefix);

/// Globally unique seal code: `<prefix><zero-padded suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SealCode(String);

impl SealCode {
    /// Validate an externally supplied code (e.g. from a request path).
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        alphanumeric_upper("seal code", raw, MAX_ID_LEN).map(Self)
    }

    /// Build the code for `suffix` within `prefix`.
    ///
    /// The suffix is zero-padded to `width` digits; wider suffixes are
    /// rendered in full.
    pub fn compose(prefix: &Prefix, suffix: u64, width: usize) -> Self {
        Self(format!("{}{:0width$}", prefix.as_str(), suffix, width = width))
    }
}

string_newtype_impls!(SealCode);

/// Identifier of the batch a seal was generated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotNumber(String);

impl LotNumber {
    /// Validate a lot number.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded("lot number", raw, MAX_ID_LEN).map(Self)
    }

    /// Blank input means "no lot"; anything else must validate.
    pub fn optional(raw: &str) -> Result<Option<Self>, ValidationError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Self::new(raw).map(Some)
    }
}

string_newtype_impls!(LotNumber);

/// Reference to an organizational unit that can hold seals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectorId(String);

impl SectorId {
    /// Validate a sector reference.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded("sector id", raw, MAX_ID_LEN).map(Self)
    }
}

string_newtype_impls!(SectorId);

/// Reference to the shipment a seal secures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShipmentId(String);

impl ShipmentId {
    /// Validate a shipment reference.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded("shipment id", raw, MAX_ID_LEN).map(Self)
    }
}

string_newtype_impls!(ShipmentId);
