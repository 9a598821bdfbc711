//! Diagnostic records for data-quality problems.
//!
//! Expected problems in source artifacts (parse failures, schema violations,
//! dangling references) are not errors in the control-flow sense: each phase
//! collects every problem it sees into a list of `Diagnostic`s and keeps
//! going, so one pass over a data directory reports everything at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Diagnostic severity. Only `Error` severity affects exit codes;
/// warnings are reported and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

/// A single reported problem, tied to the source artifact it came from.
///
/// `keys` carries the entity keys involved (component, standard, control, ...)
/// in a deterministic map so serialized output is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub source_path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,
    /// Declaration position inside the source artifact, used only to order
    /// diagnostics deterministically. Not part of the serialized record.
    #[serde(skip)]
    pub order: usize,
}

impl Diagnostic {
    pub fn new(code: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            source_path: String::new(),
            keys: BTreeMap::new(),
            order: 0,
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warn, message)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn with_key(mut self, name: &str, value: impl Into<String>) -> Self {
        self.keys.insert(name.to_string(), value.into());
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// One-line-per-field human rendering for terminal output.
    pub fn format_terminal(&self) -> String {
        let mut s = format!("{} [{}] {}\n", self.severity, self.code, self.message);
        if !self.source_path.is_empty() {
            s.push_str(&format!("  source: {}\n", self.source_path));
        }
        for (name, value) in &self.keys {
            s.push_str(&format!("  {}: {}\n", name, value));
        }
        s
    }

    /// Canonical ordering: (source path, declaration order, code, message).
    /// Re-running against unchanged input yields byte-identical output.
    pub fn sort(diagnostics: &mut [Diagnostic]) {
        diagnostics.sort_by(|a, b| {
            (&a.source_path, a.order, &a.code, &a.message).cmp(&(
                &b.source_path,
                b.order,
                &b.code,
                &b.message,
            ))
        });
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_terminal())
    }
}

/// True if any diagnostic is at `Error` severity.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Stable diagnostic codes.
pub mod codes {
    // Load / validation (recorded, load continues)
    pub const E_PARSE: &str = "E_PARSE";
    pub const E_SCHEMA: &str = "E_SCHEMA";
    pub const E_SEMANTIC: &str = "E_SEMANTIC";

    // Graph construction
    pub const E_DUPLICATE_KEY: &str = "E_DUPLICATE_KEY";

    // Referential integrity (never fatal)
    pub const E_UNKNOWN_STANDARD: &str = "E_UNKNOWN_STANDARD";
    pub const E_UNKNOWN_CONTROL: &str = "E_UNKNOWN_CONTROL";
    pub const W_UNSATISFIED_CONTROL: &str = "W_UNSATISFIED_CONTROL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_orders_by_path_then_declaration() {
        let mut diags = vec![
            Diagnostic::error(codes::E_SEMANTIC, "b").with_path("b.yaml").with_order(1),
            Diagnostic::error(codes::E_SEMANTIC, "a").with_path("b.yaml").with_order(0),
            Diagnostic::error(codes::E_PARSE, "c").with_path("a.yaml"),
        ];
        Diagnostic::sort(&mut diags);
        assert_eq!(diags[0].source_path, "a.yaml");
        assert_eq!(diags[1].message, "a");
        assert_eq!(diags[2].message, "b");
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let warn = vec![Diagnostic::warning(codes::W_UNSATISFIED_CONTROL, "w")];
        assert!(!has_errors(&warn));
        let err = vec![Diagnostic::error(codes::E_PARSE, "e")];
        assert!(has_errors(&err));
    }

    #[test]
    fn serialized_record_has_stable_shape() {
        let d = Diagnostic::error(codes::E_UNKNOWN_CONTROL, "no such control")
            .with_path("components/app2.yaml")
            .with_key("component", "app2")
            .with_key("control", "AC-99");
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["code"], "E_UNKNOWN_CONTROL");
        assert_eq!(v["severity"], "error");
        assert_eq!(v["keys"]["component"], "app2");
        assert!(v.get("order").is_none());
    }
}
