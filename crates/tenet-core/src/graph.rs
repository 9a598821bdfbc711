//! Graph construction and the immutable snapshot.
//!
//! The builder indexes validated artifacts by key. It does not check that
//! satisfaction targets exist (the integrity checker's job): dangling
//! references are indexed as declared so they can be reported with full
//! context later. Once built, the snapshot is never mutated; it can be
//! shared freely across concurrent readers.

use std::collections::BTreeMap;

use tracing::debug;

use crate::diagnostic::{codes, Diagnostic};
use crate::model::{Certification, Component, Control, Standard};
use crate::validate::ValidatedSet;

/// The snapshot plus every diagnostic accumulated through load, validation,
/// and construction.
#[derive(Debug)]
pub struct Build {
    pub snapshot: Snapshot,
    pub diagnostics: Vec<Diagnostic>,
}

/// The immutable compliance graph for one invocation.
///
/// Key-sorted maps give canonical iteration order for free, so report and
/// document output is deterministic without extra sorting.
#[derive(Debug, Default)]
pub struct Snapshot {
    components: BTreeMap<String, Component>,
    standards: BTreeMap<String, Standard>,
    certifications: BTreeMap<String, Certification>,
}

impl Snapshot {
    pub fn component(&self, key: &str) -> Option<&Component> {
        self.components.get(key)
    }

    pub fn standard(&self, key: &str) -> Option<&Standard> {
        self.standards.get(key)
    }

    pub fn certification(&self, key: &str) -> Option<&Certification> {
        self.certifications.get(key)
    }

    pub fn control(&self, standard_key: &str, control_key: &str) -> Option<&Control> {
        self.standards
            .get(standard_key)
            .and_then(|s| s.controls.get(control_key))
    }

    /// Components in canonical (key-sorted) order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Standards in canonical (key-sorted) order.
    pub fn standards(&self) -> impl Iterator<Item = &Standard> {
        self.standards.values()
    }

    /// Certifications in canonical (key-sorted) order.
    pub fn certifications(&self) -> impl Iterator<Item = &Certification> {
        self.certifications.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn standard_count(&self) -> usize {
        self.standards.len()
    }

    pub fn certification_count(&self) -> usize {
        self.certifications.len()
    }
}

/// Index one entity, or report the key collision. First occurrence wins;
/// the conflicting entity is skipped, never silently overwritten.
fn index_entity<T>(
    map: &mut BTreeMap<String, T>,
    key: String,
    entity: T,
    kind: &str,
    source_path: String,
    first_path_of: impl Fn(&T) -> String,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match map.entry(key) {
        std::collections::btree_map::Entry::Vacant(slot) => {
            slot.insert(entity);
        }
        std::collections::btree_map::Entry::Occupied(existing) => {
            diagnostics.push(
                Diagnostic::error(
                    codes::E_DUPLICATE_KEY,
                    format!("duplicate {} key: {}", kind, existing.key()),
                )
                .with_path(source_path)
                .with_key("key", existing.key().clone())
                .with_key("first_declared_at", first_path_of(existing.get())),
            );
        }
    }
}

/// Assemble the validated artifact set into a snapshot.
///
/// Artifacts are processed in sorted-by-source-path order. The loader already
/// guarantees this, but the builder re-asserts it so determinism never
/// depends on upstream behavior.
pub fn build(mut set: ValidatedSet) -> Build {
    set.components.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    set.standards.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    set.certifications
        .sort_by(|a, b| a.source_path.cmp(&b.source_path));

    let mut snapshot = Snapshot::default();
    let mut diagnostics = set.diagnostics;

    for component in set.components {
        let path = component.source_path.display().to_string();
        index_entity(
            &mut snapshot.components,
            component.key.clone(),
            component,
            "component",
            path,
            |c| c.source_path.display().to_string(),
            &mut diagnostics,
        );
    }
    for standard in set.standards {
        let path = standard.source_path.display().to_string();
        index_entity(
            &mut snapshot.standards,
            standard.key.clone(),
            standard,
            "standard",
            path,
            |s| s.source_path.display().to_string(),
            &mut diagnostics,
        );
    }
    for certification in set.certifications {
        let path = certification.source_path.display().to_string();
        index_entity(
            &mut snapshot.certifications,
            certification.key.clone(),
            certification,
            "certification",
            path,
            |c| c.source_path.display().to_string(),
            &mut diagnostics,
        );
    }

    Diagnostic::sort(&mut diagnostics);
    debug!(
        components = snapshot.component_count(),
        standards = snapshot.standard_count(),
        certifications = snapshot.certification_count(),
        diagnostics = diagnostics.len(),
        "snapshot built"
    );
    Build {
        snapshot,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Satisfaction;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn component(key: &str, path: &str) -> Component {
        Component {
            key: key.to_string(),
            name: key.to_uppercase(),
            description: String::new(),
            satisfactions: Vec::new(),
            extra: BTreeMap::new(),
            source_path: PathBuf::from(path),
        }
    }

    fn set_with(components: Vec<Component>) -> ValidatedSet {
        ValidatedSet {
            components,
            ..ValidatedSet::default()
        }
    }

    #[test]
    fn duplicate_component_key_names_both_paths_and_first_wins() {
        let set = set_with(vec![
            component("app1", "components/b.yaml"),
            component("app1", "components/a.yaml"),
        ]);
        let build = build(set);
        assert_eq!(build.diagnostics.len(), 1);
        let d = &build.diagnostics[0];
        assert_eq!(d.code, codes::E_DUPLICATE_KEY);
        assert_eq!(d.keys["key"], "app1");
        assert_eq!(d.keys["first_declared_at"], "components/a.yaml");
        assert_eq!(d.source_path, "components/b.yaml");
        // First in path order survives, not first in input order.
        let survivor = build.snapshot.component("app1").unwrap();
        assert_eq!(survivor.source_path, PathBuf::from("components/a.yaml"));
    }

    #[test]
    fn dangling_satisfactions_are_indexed_as_declared() {
        let mut c = component("app2", "components/app2.yaml");
        c.satisfactions.push(Satisfaction {
            standard_key: "NO-SUCH-STANDARD".into(),
            control_key: "AC-1".into(),
            narrative: "claimed".into(),
            status: "complete".into(),
            covered_by: Vec::new(),
            index: 0,
        });
        let build = build(set_with(vec![c]));
        assert!(build.diagnostics.is_empty(), "builder does not integrity-check");
        let stored = build.snapshot.component("app2").unwrap();
        assert_eq!(stored.satisfactions[0].standard_key, "NO-SUCH-STANDARD");
    }

    #[test]
    fn iteration_is_key_sorted_regardless_of_input_order() {
        let set = set_with(vec![
            component("zeta", "components/1.yaml"),
            component("alpha", "components/2.yaml"),
            component("mid", "components/3.yaml"),
        ]);
        let build = build(set);
        let keys: Vec<_> = build.snapshot.components().map(|c| c.key.clone()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}
