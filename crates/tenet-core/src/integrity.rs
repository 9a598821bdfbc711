//! Referential integrity checking.
//!
//! A pure reader over the snapshot: walks every cross-artifact reference,
//! collects every violation, and never stops early. Integrity problems are
//! diagnostics, not errors; the graph that contains them is still usable.

use std::collections::BTreeSet;

use crate::config::CheckOptions;
use crate::diagnostic::{codes, Diagnostic};
use crate::graph::Snapshot;

/// Produce the complete set of integrity diagnostics for a snapshot,
/// ordered by (source artifact path, declaration order within the artifact).
pub fn check(snapshot: &Snapshot, options: &CheckOptions) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for component in snapshot.components() {
        let path = component.source_path.display().to_string();
        for sat in &component.satisfactions {
            match snapshot.standard(&sat.standard_key) {
                None => diagnostics.push(
                    Diagnostic::error(
                        codes::E_UNKNOWN_STANDARD,
                        format!(
                            "satisfaction references unknown standard: {}",
                            sat.standard_key
                        ),
                    )
                    .with_path(path.clone())
                    .with_key("component", component.key.clone())
                    .with_key("standard", sat.standard_key.clone())
                    .with_order(sat.index),
                ),
                Some(standard) => {
                    if !standard.controls.contains_key(&sat.control_key) {
                        diagnostics.push(
                            Diagnostic::error(
                                codes::E_UNKNOWN_CONTROL,
                                format!(
                                    "satisfaction references unknown control: {}/{}",
                                    sat.standard_key, sat.control_key
                                ),
                            )
                            .with_path(path.clone())
                            .with_key("component", component.key.clone())
                            .with_key("standard", sat.standard_key.clone())
                            .with_key("control", sat.control_key.clone())
                            .with_order(sat.index),
                        );
                    }
                }
            }
        }
    }

    for certification in snapshot.certifications() {
        let path = certification.source_path.display().to_string();
        for (index, standard_key) in certification.standards.iter().enumerate() {
            if snapshot.standard(standard_key).is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        codes::E_UNKNOWN_STANDARD,
                        format!("certification references unknown standard: {}", standard_key),
                    )
                    .with_path(path.clone())
                    .with_key("certification", certification.key.clone())
                    .with_key("standard", standard_key.clone())
                    .with_order(index),
                );
            }
        }
    }

    if options.unsatisfied_controls {
        let satisfied: BTreeSet<(&str, &str)> = snapshot
            .components()
            .flat_map(|c| {
                c.satisfactions
                    .iter()
                    .map(|s| (s.standard_key.as_str(), s.control_key.as_str()))
            })
            .collect();
        for standard in snapshot.standards() {
            let path = standard.source_path.display().to_string();
            for (index, control_key) in standard.controls.keys().enumerate() {
                if !satisfied.contains(&(standard.key.as_str(), control_key.as_str())) {
                    diagnostics.push(
                        Diagnostic::warning(
                            codes::W_UNSATISFIED_CONTROL,
                            format!(
                                "no component satisfies control: {}/{}",
                                standard.key, control_key
                            ),
                        )
                        .with_path(path.clone())
                        .with_key("standard", standard.key.clone())
                        .with_key("control", control_key.clone())
                        .with_order(index),
                    );
                }
            }
        }
    }

    Diagnostic::sort(&mut diagnostics);
    diagnostics
}
