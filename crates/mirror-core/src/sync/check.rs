//! Drift report types
//!
//! Describe how the on-disk mirror differs from the one a sync would
//! produce.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a generated file differs from its expected state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftKind {
    /// Present with different content
    Changed,
    /// Expected but absent
    Missing,
    /// Present under the generated subtree without a matching entry
    Unexpected,
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed => write!(f, "changed"),
            Self::Missing => write!(f, "missing"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// One drifted file, by workspace-relative path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftRecord {
    pub kind: DriftKind,
    pub path: String,
}

impl DriftRecord {
    pub fn new(kind: DriftKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Result of a drift check
///
/// Changed and missing records come first in docs map order, followed by
/// unexpected records in sorted path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub records: Vec<DriftRecord>,
}

impl DriftReport {
    pub fn new(records: Vec<DriftRecord>) -> Self {
        Self { records }
    }

    /// Whether the mirror matches its sources exactly
    pub fn is_up_to_date(&self) -> bool {
        self.records.is_empty()
    }

    pub fn changed(&self) -> impl Iterator<Item = &DriftRecord> {
        self.of_kind(DriftKind::Changed)
    }

    pub fn missing(&self) -> impl Iterator<Item = &DriftRecord> {
        self.of_kind(DriftKind::Missing)
    }

    pub fn unexpected(&self) -> impl Iterator<Item = &DriftRecord> {
        self.of_kind(DriftKind::Unexpected)
    }

    fn of_kind(&self, kind: DriftKind) -> impl Iterator<Item = &DriftRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }
}
