//! Artifact discovery and parsing.
//!
//! The loader walks the kind subdirectories of the data root and parses each
//! YAML file into a raw key-value document. A malformed file never aborts the
//! load: the failure is recorded as a diagnostic against that file and the
//! remaining files are still read, so the caller sees every parse failure in
//! one pass. Only an unusable data root is fatal.
//!
//! Documents are sorted by source path before being returned; callers must
//! not rely on filesystem iteration order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::diagnostic::{codes, Diagnostic};
use crate::errors::LoadError;

/// The recognized artifact kinds and their subdirectory convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
    Component,
    Standard,
    Certification,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Component,
        ArtifactKind::Standard,
        ArtifactKind::Certification,
    ];

    /// Subdirectory under the data root holding artifacts of this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::Component => "components",
            ArtifactKind::Standard => "standards",
            ArtifactKind::Certification => "certifications",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Component => "component",
            ArtifactKind::Standard => "standard",
            ArtifactKind::Certification => "certification",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed artifact file, not yet validated.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    /// Key to use when the document does not declare one: the file stem, or
    /// the directory name for the nested `<key>/component.yaml` form.
    pub default_key: String,
    pub content: Value,
}

/// All documents and parse diagnostics from one pass over the data root.
#[derive(Debug, Default)]
pub struct LoadSet {
    pub documents: Vec<RawDocument>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A file slated for parsing, found during directory discovery.
#[derive(Debug, Clone)]
struct Discovered {
    kind: ArtifactKind,
    path: PathBuf,
    default_key: String,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn data_dir_error(root: &Path, source: std::io::Error) -> LoadError {
    LoadError::DataDir {
        path: root.to_path_buf(),
        source,
    }
}

/// Enumerate artifact files under the data root. A missing kind subdirectory
/// contributes zero documents; a missing or unreadable root is fatal.
fn discover(root: &Path) -> Result<Vec<Discovered>, LoadError> {
    let meta = std::fs::metadata(root).map_err(|e| data_dir_error(root, e))?;
    if !meta.is_dir() {
        return Err(data_dir_error(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut found = Vec::new();
    for kind in ArtifactKind::ALL {
        let dir = root.join(kind.dir_name());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(data_dir_error(root, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| data_dir_error(root, e))?;
            let path = entry.path();
            if path.is_file() && is_yaml(&path) {
                let default_key = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                found.push(Discovered {
                    kind,
                    path,
                    default_key,
                });
            } else if kind == ArtifactKind::Component && path.is_dir() {
                // Nested form: components/<key>/component.yaml
                let default_key = entry.file_name().to_string_lossy().into_owned();
                for name in ["component.yaml", "component.yml"] {
                    let nested = path.join(name);
                    if nested.is_file() {
                        found.push(Discovered {
                            kind,
                            path: nested,
                            default_key,
                        });
                        break;
                    }
                }
            }
        }
    }
    found.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(files = found.len(), root = %root.display(), "discovered artifact files");
    Ok(found)
}

/// Parse one file's text, or explain why it cannot be used.
fn parse_document(file: &Discovered, text: &str) -> Result<RawDocument, Diagnostic> {
    let parse_diag = |message: String| {
        Diagnostic::error(codes::E_PARSE, message).with_path(file.path.display().to_string())
    };

    let yaml: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| parse_diag(format!("malformed YAML: {}", e)))?;
    if !yaml.is_mapping() {
        return Err(parse_diag("document top level is not a mapping".into()));
    }
    let content = serde_json::to_value(&yaml)
        .map_err(|e| parse_diag(format!("document is not representable: {}", e)))?;

    Ok(RawDocument {
        kind: file.kind,
        path: file.path.clone(),
        default_key: file.default_key.clone(),
        content,
    })
}

/// Fold one file's read result into the load set.
fn record(set: &mut LoadSet, file: &Discovered, read: std::io::Result<String>) {
    match read {
        Ok(text) => match parse_document(file, &text) {
            Ok(doc) => set.documents.push(doc),
            Err(diag) => set.diagnostics.push(diag),
        },
        Err(e) => set.diagnostics.push(
            Diagnostic::error(codes::E_PARSE, format!("failed to read file: {}", e))
                .with_path(file.path.display().to_string()),
        ),
    }
}

fn finish(mut set: LoadSet) -> LoadSet {
    set.documents.sort_by(|a, b| a.path.cmp(&b.path));
    Diagnostic::sort(&mut set.diagnostics);
    debug!(
        documents = set.documents.len(),
        diagnostics = set.diagnostics.len(),
        "load complete"
    );
    set
}

/// Load every artifact under `root`, reading files sequentially.
pub fn load_dir(root: &Path) -> Result<LoadSet, LoadError> {
    let files = discover(root)?;
    let mut set = LoadSet::default();
    for file in &files {
        record(&mut set, file, std::fs::read_to_string(&file.path));
    }
    Ok(finish(set))
}

/// Load every artifact under `root`, reading at most `max_in_flight` files
/// concurrently. Results are re-sorted by path after joining, so the output
/// is byte-identical with [`load_dir`] regardless of I/O completion order.
/// Dropping the future before completion publishes nothing.
pub async fn load_dir_parallel(root: &Path, max_in_flight: usize) -> anyhow::Result<LoadSet> {
    let files = discover(root)?;
    let sem = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut join_set = JoinSet::new();

    for file in files {
        let permit = sem.clone().acquire_owned().await?;
        join_set.spawn(async move {
            let _permit = permit;
            let read = tokio::fs::read_to_string(&file.path).await;
            (file, read)
        });
    }

    let mut set = LoadSet::default();
    while let Some(joined) = join_set.join_next().await {
        let (file, read) = joined?;
        record(&mut set, &file, read);
    }
    Ok(finish(set))
}
