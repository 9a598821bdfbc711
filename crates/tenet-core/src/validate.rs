//! Schema and semantic validation of raw documents.
//!
//! Validation is exhaustive per document: every schema violation is collected
//! before the document is rejected, and every semantic problem is collected
//! for documents that pass the schema. A document with schema errors cannot
//! be structurally trusted and is excluded from graph construction; a
//! document with only semantic problems is included but flagged.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use jsonschema::Draft;
use serde::Deserialize;
use serde_json::Value;

use crate::diagnostic::{codes, Diagnostic};
use crate::loader::{ArtifactKind, LoadSet, RawDocument};
use crate::model::{Certification, Component, Control, Family, Satisfaction, Standard, Status};

const COMPONENT_SCHEMA_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../schemas/component.schema.json"
));
const STANDARD_SCHEMA_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../schemas/standard.schema.json"
));
const CERTIFICATION_SCHEMA_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../schemas/certification.schema.json"
));

struct Validators {
    component: jsonschema::Validator,
    standard: jsonschema::Validator,
    certification: jsonschema::Validator,
}

static VALIDATORS: OnceLock<Result<Validators, String>> = OnceLock::new();

fn compile(name: &str, schema_json: &str) -> Result<jsonschema::Validator, String> {
    let schema: Value = serde_json::from_str(schema_json)
        .map_err(|e| format!("failed to parse embedded {} schema JSON: {}", name, e))?;

    // Our schema strategy is Draft 2020-12.
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| format!("failed to compile {} schema: {}", name, e))
}

fn compiled_validators() -> Result<&'static Validators> {
    VALIDATORS
        .get_or_init(|| {
            Ok(Validators {
                component: compile("component", COMPONENT_SCHEMA_JSON)?,
                standard: compile("standard", STANDARD_SCHEMA_JSON)?,
                certification: compile("certification", CERTIFICATION_SCHEMA_JSON)?,
            })
        })
        .as_ref()
        .map_err(|e| anyhow!("{e}"))
}

/// Typed artifacts plus every parse/schema/semantic diagnostic from one pass.
/// Artifact vectors keep the load set's source-path order.
#[derive(Debug, Default)]
pub struct ValidatedSet {
    pub components: Vec<Component>,
    pub standards: Vec<Standard>,
    pub certifications: Vec<Certification>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Deserialize)]
struct ComponentDoc {
    key: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    satisfies: Vec<SatisfactionDoc>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct SatisfactionDoc {
    standard: String,
    control: String,
    narrative: String,
    status: String,
    #[serde(default)]
    covered_by: Vec<String>,
}

#[derive(Deserialize)]
struct StandardDoc {
    key: Option<String>,
    name: String,
    #[serde(default)]
    families: BTreeMap<String, FamilyDoc>,
    #[serde(default)]
    controls: BTreeMap<String, ControlDoc>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct FamilyDoc {
    name: String,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct ControlDoc {
    name: String,
    #[serde(default)]
    description: String,
    parameters: Option<Value>,
}

#[derive(Deserialize)]
struct CertificationDoc {
    key: Option<String>,
    name: String,
    standards: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn schema_validator(kind: ArtifactKind, v: &Validators) -> &jsonschema::Validator {
    match kind {
        ArtifactKind::Component => &v.component,
        ArtifactKind::Standard => &v.standard,
        ArtifactKind::Certification => &v.certification,
    }
}

/// All schema violations for one document, or empty if it conforms.
fn schema_diagnostics(doc: &RawDocument, validator: &jsonschema::Validator) -> Vec<Diagnostic> {
    validator
        .iter_errors(&doc.content)
        .map(|e| {
            Diagnostic::error(
                codes::E_SCHEMA,
                format!("{} artifact: {} (at {})", doc.kind, e, e.instance_path()),
            )
            .with_path(doc.path.display().to_string())
        })
        .collect()
}

fn decode_failure(doc: &RawDocument, err: serde_json::Error) -> Diagnostic {
    Diagnostic::error(
        codes::E_SCHEMA,
        format!("{} artifact does not decode: {}", doc.kind, err),
    )
    .with_path(doc.path.display().to_string())
}

fn component_from(doc: &RawDocument, out: &mut ValidatedSet) {
    let typed: ComponentDoc = match serde_json::from_value(doc.content.clone()) {
        Ok(t) => t,
        Err(e) => {
            out.diagnostics.push(decode_failure(doc, e));
            return;
        }
    };
    let key = typed.key.unwrap_or_else(|| doc.default_key.clone());
    let path = doc.path.display().to_string();

    let mut satisfactions = Vec::with_capacity(typed.satisfies.len());
    for (index, s) in typed.satisfies.into_iter().enumerate() {
        if s.status.parse::<Status>().is_err() {
            out.diagnostics.push(
                Diagnostic::error(
                    codes::E_SEMANTIC,
                    format!("satisfaction status not recognized: {}", s.status),
                )
                .with_path(path.clone())
                .with_key("component", key.clone())
                .with_key("standard", s.standard.clone())
                .with_key("control", s.control.clone())
                .with_order(index),
            );
        }
        if s.narrative.trim().is_empty() {
            out.diagnostics.push(
                Diagnostic::error(codes::E_SEMANTIC, "satisfaction narrative is empty")
                    .with_path(path.clone())
                    .with_key("component", key.clone())
                    .with_key("standard", s.standard.clone())
                    .with_key("control", s.control.clone())
                    .with_order(index),
            );
        }
        satisfactions.push(Satisfaction {
            standard_key: s.standard,
            control_key: s.control,
            narrative: s.narrative,
            status: s.status,
            covered_by: s.covered_by,
            index,
        });
    }

    out.components.push(Component {
        key,
        name: typed.name,
        description: typed.description,
        satisfactions,
        extra: typed.extra,
        source_path: doc.path.clone(),
    });
}

fn standard_from(doc: &RawDocument, out: &mut ValidatedSet) {
    let typed: StandardDoc = match serde_json::from_value(doc.content.clone()) {
        Ok(t) => t,
        Err(e) => {
            out.diagnostics.push(decode_failure(doc, e));
            return;
        }
    };
    let key = typed.key.unwrap_or_else(|| doc.default_key.clone());

    let families = typed
        .families
        .into_iter()
        .map(|(id, f)| {
            (
                id,
                Family {
                    name: f.name,
                    extra: f.extra,
                },
            )
        })
        .collect();
    let controls = typed
        .controls
        .into_iter()
        .map(|(ckey, c)| {
            (
                ckey.clone(),
                Control {
                    key: ckey,
                    name: c.name,
                    description: c.description,
                    parameters: c.parameters,
                },
            )
        })
        .collect();

    out.standards.push(Standard {
        key,
        name: typed.name,
        families,
        controls,
        extra: typed.extra,
        source_path: doc.path.clone(),
    });
}

fn certification_from(doc: &RawDocument, out: &mut ValidatedSet) {
    let typed: CertificationDoc = match serde_json::from_value(doc.content.clone()) {
        Ok(t) => t,
        Err(e) => {
            out.diagnostics.push(decode_failure(doc, e));
            return;
        }
    };
    let key = typed.key.unwrap_or_else(|| doc.default_key.clone());

    if typed.standards.is_empty() {
        out.diagnostics.push(
            Diagnostic::error(codes::E_SEMANTIC, "certification references no standards")
                .with_path(doc.path.display().to_string())
                .with_key("certification", key.clone()),
        );
    }

    out.certifications.push(Certification {
        key,
        name: typed.name,
        standards: typed.standards,
        extra: typed.extra,
        source_path: doc.path.clone(),
    });
}

/// Validate every document in the load set, carrying its parse diagnostics
/// through, so one call surfaces all parse, schema, and semantic problems.
pub fn validate_set(set: LoadSet) -> Result<ValidatedSet> {
    let validators = compiled_validators()?;
    let mut out = ValidatedSet {
        diagnostics: set.diagnostics,
        ..ValidatedSet::default()
    };

    for doc in &set.documents {
        let schema_diags = schema_diagnostics(doc, schema_validator(doc.kind, validators));
        if !schema_diags.is_empty() {
            // Structurally untrusted: excluded from graph construction.
            out.diagnostics.extend(schema_diags);
            continue;
        }
        match doc.kind {
            ArtifactKind::Component => component_from(doc, &mut out),
            ArtifactKind::Standard => standard_from(doc, &mut out),
            ArtifactKind::Certification => certification_from(doc, &mut out),
        }
    }

    Diagnostic::sort(&mut out.diagnostics);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn raw(kind: ArtifactKind, path: &str, default_key: &str, content: Value) -> RawDocument {
        RawDocument {
            kind,
            path: PathBuf::from(path),
            default_key: default_key.to_string(),
            content,
        }
    }

    fn set_of(documents: Vec<RawDocument>) -> LoadSet {
        LoadSet {
            documents,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn schemas_compile() {
        let _ = compiled_validators().expect("embedded schemas should compile");
    }

    #[test]
    fn all_schema_violations_are_collected() {
        let doc = raw(
            ArtifactKind::Component,
            "components/app1.yaml",
            "app1",
            json!({
                "description": 42,
                "satisfies": [{ "standard": "S" }]
            }),
        );
        let out = validate_set(set_of(vec![doc])).unwrap();
        assert!(out.components.is_empty(), "schema-invalid doc must be excluded");
        let schema_errors = out
            .diagnostics
            .iter()
            .filter(|d| d.code == codes::E_SCHEMA)
            .count();
        assert!(schema_errors >= 3, "missing name, bad description, incomplete satisfaction");
    }

    #[test]
    fn semantic_problems_flag_but_keep_the_document() {
        let doc = raw(
            ArtifactKind::Component,
            "components/app1.yaml",
            "app1",
            json!({
                "name": "App One",
                "satisfies": [
                    { "standard": "S", "control": "C-1", "narrative": "  ", "status": "done" }
                ]
            }),
        );
        let out = validate_set(set_of(vec![doc])).unwrap();
        assert_eq!(out.components.len(), 1);
        let codes_seen: Vec<_> = out.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes_seen, vec![codes::E_SEMANTIC, codes::E_SEMANTIC]);
    }

    #[test]
    fn key_defaults_from_loader_and_declared_key_wins() {
        let defaulted = raw(
            ArtifactKind::Standard,
            "standards/NIST-800-53.yaml",
            "NIST-800-53",
            json!({ "name": "NIST SP 800-53", "controls": { "AC-2": { "name": "Account Management" } } }),
        );
        let declared = raw(
            ArtifactKind::Certification,
            "certifications/low.yaml",
            "low",
            json!({ "key": "fisma-low", "name": "FISMA Low", "standards": ["NIST-800-53"] }),
        );
        let out = validate_set(set_of(vec![defaulted, declared])).unwrap();
        assert_eq!(out.standards[0].key, "NIST-800-53");
        assert_eq!(out.standards[0].controls["AC-2"].name, "Account Management");
        assert_eq!(out.certifications[0].key, "fisma-low");
    }

    #[test]
    fn unmodeled_fields_are_preserved_in_extra() {
        let doc = raw(
            ArtifactKind::Component,
            "components/app1.yaml",
            "app1",
            json!({ "name": "App One", "owner": "platform-team" }),
        );
        let out = validate_set(set_of(vec![doc])).unwrap();
        assert_eq!(out.components[0].extra["owner"], json!("platform-team"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn satisfaction_records_preserve_narrative_and_status_verbatim() {
        let doc = raw(
            ArtifactKind::Component,
            "components/app1.yaml",
            "app1",
            json!({
                "name": "App One",
                "satisfies": [
                    { "standard": "S", "control": "C-1", "narrative": "first", "status": "Complete" },
                    { "standard": "S", "control": "C-2", "narrative": "second", "status": "planned" },
                    { "standard": "S", "control": "C-3", "narrative": "third", "status": "n/a" }
                ]
            }),
        );
        let out = validate_set(set_of(vec![doc])).unwrap();
        let sats = &out.components[0].satisfactions;
        assert_eq!(sats.len(), 3);
        assert_eq!(sats[0].status, "Complete");
        assert_eq!(sats[0].parsed_status(), Some(Status::Complete));
        assert_eq!(sats[1].narrative, "second");
        assert_eq!(sats[2].index, 2);
    }
}
