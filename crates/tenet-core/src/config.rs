//! Tool configuration (`tenet.yaml`).
//!
//! Precedence, highest first: command-line flags, the config file, built-in
//! defaults. An explicitly requested config file must exist; the implicit
//! default file being absent just means defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;

/// Name of the config file looked up in the working directory when no
/// `--config` flag is given.
pub const DEFAULT_CONFIG_FILE: &str = "tenet.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the artifact data directory tree.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub checks: CheckOptions,
    /// Generatable documents, looked up by id.
    #[serde(default)]
    pub documents: Vec<DocumentDecl>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            checks: CheckOptions::default(),
            documents: Vec::new(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

/// Toggles for optional integrity checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckOptions {
    /// Warn about controls with zero satisfying components. Off by default.
    #[serde(default)]
    pub unsatisfied_controls: bool,
}

/// A generatable document: a template plus the data bindings it needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentDecl {
    pub id: String,
    pub title: String,
    pub template: PathBuf,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// One named entry in a document's data context.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Binding {
    pub name: String,
    pub query: BindingQuery,
}

/// The queries a binding may resolve against the snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum BindingQuery {
    AllComponents,
    Component { key: String },
    ComponentsSatisfyingStandard { standard: String },
    ControlsInFamily { standard: String, family: String },
    CertificationStandards { certification: String },
}

impl Config {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicit config file, or the default file if present, or
    /// built-in defaults otherwise.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Look up a document declaration by id.
    pub fn document(&self, id: &str) -> Option<&DocumentDecl> {
        self.documents.iter().find(|d| d.id == id)
    }
}
