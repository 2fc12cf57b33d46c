//! Directory entry domain model.
//!
//! # Responsibility
//! - Define the canonical contact record and its embedded address.
//! - Validate caller-supplied write input before it reaches persistence.
//!
//! # Invariants
//! - `id` is assigned once by storage and never changes afterwards.
//! - `Address` fields are plain strings; "no address" is the all-empty value,
//!   not an `Option`. Nullability stops at the persistence boundary.
//! - Timestamps are RFC 3339 UTC text, `created_at` set once at creation and
//!   `updated_at` refreshed on every successful write.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned row identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Surfaced externally as a string; see [`id_as_string`] and the service
/// layer's `parse_directory_id`.
pub type DirectoryId = i64;

/// Structured location data owned by exactly one directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Address {
    /// Returns true when at least one field carries text.
    ///
    /// The transactional writer uses this predicate to decide whether an
    /// address row is materialized at all: an all-empty address must leave
    /// zero rows behind.
    pub fn has_content(&self) -> bool {
        !(self.address_line_1.is_empty()
            && self.address_line_2.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.country.is_empty())
    }
}

/// A persisted contact record including storage-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Storage id, immutable after creation. Serialized as a string to match
    /// the external contract.
    #[serde(with = "id_as_string")]
    pub id: DirectoryId,
    pub name: String,
    pub phone_number: String,
    pub address: Address,
    /// RFC 3339 UTC, set once at creation.
    pub created_at: String,
    /// RFC 3339 UTC, refreshed by every successful mutation.
    pub updated_at: String,
}

/// Caller-supplied fields for create/update requests.
///
/// Identity and timestamps are always server-assigned, so the write shape
/// deliberately has no place to carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryDraft {
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: Address,
}

impl DirectoryDraft {
    /// Checks write-input rules shared by create and update.
    ///
    /// # Errors
    /// - `EmptyName` when the name is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), DirectoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(DirectoryValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Caller-input rejection reasons, surfaced distinctly from storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryValidationError {
    EmptyName,
    InvalidId(String),
}

impl Display for DirectoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "directory name must not be empty"),
            Self::InvalidId(raw) => write!(f, "invalid directory id `{raw}`"),
        }
    }
}

impl Error for DirectoryValidationError {}

mod id_as_string {
    use super::DirectoryId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &DirectoryId, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DirectoryId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<DirectoryId>().map_err(serde::de::Error::custom)
    }
}
