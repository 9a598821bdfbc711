//! Entity records for the compliance graph.
//!
//! Cross-artifact references are plain string keys, never embedded pointers:
//! a dangling reference is representable and detectable instead of being a
//! structural failure. All records are immutable once the snapshot is built.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// A software/service unit claiming control satisfaction.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub key: String,
    pub name: String,
    pub description: String,
    pub satisfactions: Vec<Satisfaction>,
    /// Fields present in the source document but not modeled here.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    pub source_path: PathBuf,
}

/// A component's claim of meeting one control of one standard.
#[derive(Debug, Clone, Serialize)]
pub struct Satisfaction {
    pub standard_key: String,
    pub control_key: String,
    pub narrative: String,
    /// Status as written in the source document, preserved verbatim.
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub covered_by: Vec<String>,
    /// 0-based declaration position inside the owning component document.
    pub index: usize,
}

impl Satisfaction {
    /// The status parsed into the recognized enumeration, if it parses.
    pub fn parsed_status(&self) -> Option<Status> {
        self.status.parse().ok()
    }
}

/// Recognized satisfaction statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Planned,
    Partial,
    Complete,
    NotApplicable,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Planned => "planned",
            Status::Partial => "partial",
            Status::Complete => "complete",
            Status::NotApplicable => "n/a",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planned" => Ok(Status::Planned),
            "partial" => Ok(Status::Partial),
            "complete" => Ok(Status::Complete),
            "n/a" | "not applicable" => Ok(Status::NotApplicable),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A named catalog of controls.
#[derive(Debug, Clone, Serialize)]
pub struct Standard {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub families: BTreeMap<String, Family>,
    pub controls: BTreeMap<String, Control>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    pub source_path: PathBuf,
}

/// Control family metadata within a standard.
#[derive(Debug, Clone, Serialize)]
pub struct Family {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// A single control definition, owned by exactly one standard.
#[derive(Debug, Clone, Serialize)]
pub struct Control {
    pub key: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A bundle of standards defining a compliance target.
#[derive(Debug, Clone, Serialize)]
pub struct Certification {
    pub key: String,
    pub name: String,
    pub standards: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    pub source_path: PathBuf,
}

/// Family id of a control key by naming convention: the segment before the
/// first `-` (e.g. `AC-2` belongs to family `AC`).
pub fn family_of(control_key: &str) -> &str {
    control_key.split('-').next().unwrap_or(control_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Complete".parse::<Status>().unwrap(), Status::Complete);
        assert_eq!("N/A".parse::<Status>().unwrap(), Status::NotApplicable);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn family_is_prefix_before_dash() {
        assert_eq!(family_of("AC-2"), "AC");
        assert_eq!(family_of("AU-12"), "AU");
        assert_eq!(family_of("XX"), "XX");
    }
}
