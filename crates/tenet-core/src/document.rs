//! Document generation: binding graph data into a template context.
//!
//! The generator resolves a declared document's bindings against the
//! snapshot into one data context and hands that to an opaque template
//! collaborator. It does no text rendering itself, and an unresolvable
//! binding is a hard failure: no partial context is ever produced.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::config::{Binding, BindingQuery, Config, DocumentDecl};
use crate::errors::DocumentError;
use crate::graph::Snapshot;
use crate::model::{family_of, Component};

/// The fully resolved data for one document, keyed by binding name.
pub type DataContext = BTreeMap<String, Value>;

/// The opaque templating collaborator. Receives a resolved context and the
/// template text; returns rendered text or fails.
pub trait TemplateEngine {
    fn render(&self, template: &str, context: &DataContext) -> anyhow::Result<String>;
}

/// A rendered document. Where it goes is the caller's decision.
#[derive(Debug)]
pub struct CompiledDocument {
    pub id: String,
    pub title: String,
    pub text: String,
}

fn unresolved(decl: &DocumentDecl, binding: &Binding, key: impl Into<String>) -> DocumentError {
    DocumentError::UnresolvedReference {
        document: decl.id.clone(),
        binding: binding.name.clone(),
        key: key.into(),
    }
}

fn component_value(component: &Component) -> Value {
    let satisfactions: Vec<Value> = component
        .satisfactions
        .iter()
        .map(|s| {
            json!({
                "standard": s.standard_key,
                "control": s.control_key,
                "narrative": s.narrative,
                "status": s.status,
                "covered_by": s.covered_by,
            })
        })
        .collect();
    json!({
        "key": component.key,
        "name": component.name,
        "description": component.description,
        "satisfactions": satisfactions,
    })
}

fn resolve_binding(
    snapshot: &Snapshot,
    decl: &DocumentDecl,
    binding: &Binding,
) -> Result<Value, DocumentError> {
    match &binding.query {
        BindingQuery::AllComponents => {
            let rows: Vec<Value> = snapshot.components().map(component_value).collect();
            Ok(json!(rows))
        }
        BindingQuery::Component { key } => snapshot
            .component(key)
            .map(component_value)
            .ok_or_else(|| unresolved(decl, binding, key)),
        BindingQuery::ComponentsSatisfyingStandard { standard } => {
            if snapshot.standard(standard).is_none() {
                return Err(unresolved(decl, binding, standard));
            }
            let rows: Vec<Value> = snapshot
                .components()
                .filter(|c| c.satisfactions.iter().any(|s| s.standard_key == *standard))
                .map(component_value)
                .collect();
            Ok(json!(rows))
        }
        BindingQuery::ControlsInFamily { standard, family } => {
            let Some(std) = snapshot.standard(standard) else {
                return Err(unresolved(decl, binding, standard));
            };
            let controls: Vec<Value> = std
                .controls
                .values()
                .filter(|c| family_of(&c.key) == family)
                .map(|c| {
                    json!({
                        "key": c.key,
                        "name": c.name,
                        "description": c.description,
                        "parameters": c.parameters,
                    })
                })
                .collect();
            if controls.is_empty() && !std.families.contains_key(family) {
                return Err(unresolved(decl, binding, format!("{}/{}", standard, family)));
            }
            let family_name = std
                .families
                .get(family)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| family.clone());
            Ok(json!({
                "family": family,
                "name": family_name,
                "controls": controls,
            }))
        }
        BindingQuery::CertificationStandards { certification } => {
            let Some(cert) = snapshot.certification(certification) else {
                return Err(unresolved(decl, binding, certification));
            };
            let mut rows = Vec::new();
            for standard_key in &cert.standards {
                // Hard failure on a dangling reference: a document must not
                // be generated from a partially resolvable certification.
                let Some(std) = snapshot.standard(standard_key) else {
                    return Err(unresolved(decl, binding, standard_key));
                };
                rows.push(json!({
                    "standard": std.key,
                    "name": std.name,
                    "controls": std.controls.keys().collect::<Vec<_>>(),
                }));
            }
            Ok(json!({
                "certification": cert.key,
                "name": cert.name,
                "standards": rows,
            }))
        }
    }
}

/// Resolve every binding of a declared document into one data context.
/// Fails without producing anything if any binding does not resolve.
pub fn resolve_context(
    snapshot: &Snapshot,
    decl: &DocumentDecl,
) -> Result<DataContext, DocumentError> {
    let mut context = DataContext::new();
    context.insert(
        "document".to_string(),
        json!({ "id": decl.id, "title": decl.title }),
    );
    for binding in &decl.bindings {
        let value = resolve_binding(snapshot, decl, binding)?;
        context.insert(binding.name.clone(), value);
    }
    Ok(context)
}

/// Generate a document by id: look up its declaration, resolve the context,
/// read the template, and hand both to the collaborator.
pub fn generate(
    snapshot: &Snapshot,
    config: &Config,
    id: &str,
    engine: &dyn TemplateEngine,
) -> Result<CompiledDocument, DocumentError> {
    let decl = config
        .document(id)
        .ok_or_else(|| DocumentError::UnknownDocument { id: id.to_string() })?;
    let context = resolve_context(snapshot, decl)?;
    let template =
        std::fs::read_to_string(&decl.template).map_err(|source| DocumentError::TemplateRead {
            path: decl.template.clone(),
            source,
        })?;
    let text = engine
        .render(&template, &context)
        .map_err(|cause| DocumentError::Render {
            id: decl.id.clone(),
            cause,
        })?;
    Ok(CompiledDocument {
        id: decl.id.clone(),
        title: decl.title.clone(),
        text,
    })
}
