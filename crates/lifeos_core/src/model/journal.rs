//! Activity journal model.
//!
//! # Responsibility
//! - Represent one calendar day of completed protocols.
//! - Own protocol identity validation and normalization.
//!
//! # Invariants
//! - `ProtocolId` is trimmed, lowercase, and matches the slug pattern.
//! - A journal entry lists each protocol at most once.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PROTOCOL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]{0,63}$").expect("valid protocol id regex"));

/// Stable identifier of a habit protocol, e.g. `cold_exposure`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtocolId(String);

impl ProtocolId {
    /// Parses and normalizes a protocol id.
    ///
    /// Input is trimmed and lowercased before validation.
    pub fn parse(value: &str) -> Result<Self, ProtocolIdError> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ProtocolIdError::Empty);
        }
        if !PROTOCOL_ID_RE.is_match(&normalized) {
            return Err(ProtocolIdError::Invalid(normalized));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProtocolId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProtocolId {
    type Error = ProtocolIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProtocolId> for String {
    fn from(value: ProtocolId) -> Self {
        value.0
    }
}

/// Protocol id validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolIdError {
    Empty,
    Invalid(String),
}

impl Display for ProtocolIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "protocol id must not be empty"),
            Self::Invalid(value) => write!(
                f,
                "protocol id `{value}` must match [a-z0-9][a-z0-9_.-]{{0,63}}"
            ),
        }
    }
}

impl Error for ProtocolIdError {}

/// One calendar day of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    /// Protocols completed on `date`.
    pub completed_protocols: BTreeSet<ProtocolId>,
}

impl JournalEntry {
    /// Creates an empty entry for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed_protocols: BTreeSet::new(),
        }
    }

    /// Returns whether `protocol_id` was completed on this day.
    pub fn contains(&self, protocol_id: &ProtocolId) -> bool {
        self.completed_protocols.contains(protocol_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProtocolId, ProtocolIdError};

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let id = ProtocolId::parse("  Cold_Exposure ").expect("valid id");
        assert_eq!(id.as_str(), "cold_exposure");
    }

    #[test]
    fn parse_rejects_empty_and_malformed_ids() {
        assert_eq!(ProtocolId::parse("   "), Err(ProtocolIdError::Empty));
        assert!(matches!(
            ProtocolId::parse("morning walk"),
            Err(ProtocolIdError::Invalid(_))
        ));
        assert!(matches!(
            ProtocolId::parse("-leading-dash"),
            Err(ProtocolIdError::Invalid(_))
        ));
    }

    #[test]
    fn deserialize_rejects_invalid_id() {
        let err = serde_json::from_str::<ProtocolId>("\"no spaces allowed\"").unwrap_err();
        assert!(err.to_string().contains("must match"), "unexpected: {err}");
    }
}
