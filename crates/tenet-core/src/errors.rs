//! Error types for operations that cannot proceed.
//!
//! Data-quality problems are [`crate::diagnostic::Diagnostic`]s, not errors;
//! the enums here cover the conditions that make an operation itself
//! unusable (unreadable data directory, bad config, caller mistakes).

use std::path::PathBuf;

/// Fatal load errors. Per-file problems are diagnostics, not `LoadError`s.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The configured data directory is missing or unreadable.
    #[error("data directory not usable: {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Caller errors when invoking a report. These never touch the snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report not defined: {id}")]
    UnknownReport { id: String },

    #[error("report {report} does not accept parameter: {name}")]
    UnknownParameter { report: String, name: String },

    #[error("report {report} requires parameter: {name}")]
    MissingParameter { report: String, name: String },

    #[error("report {report}: no {name} named {value}")]
    UnknownParameterValue {
        report: String,
        name: String,
        value: String,
    },
}

/// Errors fatal to a single document-generation request.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document not defined: {id}")]
    UnknownDocument { id: String },

    /// A required data binding names an entity the snapshot does not have.
    /// Distinct from integrity diagnostics: generation cannot proceed.
    #[error("document {document}: binding {binding} does not resolve: {key}")]
    UnresolvedReference {
        document: String,
        binding: String,
        key: String,
    },

    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("rendering failed for document {id}: {cause}")]
    Render { id: String, cause: anyhow::Error },
}
