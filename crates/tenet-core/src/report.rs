//! The report engine: a fixed registry of named, read-only queries.
//!
//! The registry is an immutable lookup table built once at initialization.
//! Every report is a pure function of (snapshot, parameters): results are
//! plain `serde_json` values assembled from canonical iteration order, so
//! the same invocation always yields the same bytes. Rendering and
//! serialization of results are the caller's concern.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::errors::ReportError;
use crate::graph::Snapshot;
use crate::model::{family_of, Status};

/// Caller-supplied report parameters.
pub type Params = BTreeMap<String, String>;

/// What one parameter of a report means.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub help: &'static str,
}

type RunFn = fn(&Snapshot, &Params) -> Result<Value, ReportError>;

/// A registered report descriptor.
pub struct Report {
    pub id: &'static str,
    pub title: &'static str,
    pub params: &'static [ParamSpec],
    run: RunFn,
}

/// Immutable id → report table.
pub struct Registry {
    reports: BTreeMap<&'static str, Report>,
}

impl Registry {
    pub fn new() -> Self {
        let mut reports = BTreeMap::new();
        for report in builtin_reports() {
            reports.insert(report.id, report);
        }
        Self { reports }
    }

    pub fn get(&self, id: &str) -> Option<&Report> {
        self.reports.get(id)
    }

    /// The full registry as (id, title) pairs, for listing mode.
    pub fn listing(&self) -> Vec<(&'static str, &'static str)> {
        self.reports.values().map(|r| (r.id, r.title)).collect()
    }

    /// Run a report. Unrecognized parameters and missing required
    /// parameters are caller errors, reported before the query runs.
    pub fn run(&self, id: &str, snapshot: &Snapshot, params: &Params) -> Result<Value, ReportError> {
        let report = self.get(id).ok_or_else(|| ReportError::UnknownReport {
            id: id.to_string(),
        })?;

        for name in params.keys() {
            if !report.params.iter().any(|p| p.name == name) {
                return Err(ReportError::UnknownParameter {
                    report: report.id.to_string(),
                    name: name.clone(),
                });
            }
        }
        for spec in report.params {
            if spec.required && !params.contains_key(spec.name) {
                return Err(ReportError::MissingParameter {
                    report: report.id.to_string(),
                    name: spec.name.to_string(),
                });
            }
        }

        (report.run)(snapshot, params)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_reports() -> Vec<Report> {
    vec![
        Report {
            id: "components",
            title: "Component inventory",
            params: &[],
            run: run_components,
        },
        Report {
            id: "controls",
            title: "Control catalog",
            params: &[ParamSpec {
                name: "standard",
                required: false,
                help: "restrict to one standard key",
            }],
            run: run_controls,
        },
        Report {
            id: "controls-by-status",
            title: "Satisfied controls filtered by status",
            params: &[
                ParamSpec {
                    name: "status",
                    required: true,
                    help: "satisfaction status to select (planned|partial|complete|n/a)",
                },
                ParamSpec {
                    name: "standard",
                    required: false,
                    help: "restrict to one standard key",
                },
            ],
            run: run_controls_by_status,
        },
        Report {
            id: "coverage",
            title: "Per-standard control coverage",
            params: &[ParamSpec {
                name: "standard",
                required: false,
                help: "restrict to one standard key",
            }],
            run: run_coverage,
        },
        Report {
            id: "certification",
            title: "Certification satisfaction matrix",
            params: &[ParamSpec {
                name: "certification",
                required: true,
                help: "certification key to expand",
            }],
            run: run_certification,
        },
    ]
}

/// Resolve an optional `standard` filter to a known standard key, or error.
fn standard_filter<'p>(
    report: &str,
    snapshot: &Snapshot,
    params: &'p Params,
) -> Result<Option<&'p str>, ReportError> {
    match params.get("standard") {
        None => Ok(None),
        Some(key) => {
            if snapshot.standard(key).is_none() {
                return Err(ReportError::UnknownParameterValue {
                    report: report.to_string(),
                    name: "standard".to_string(),
                    value: key.clone(),
                });
            }
            Ok(Some(key.as_str()))
        }
    }
}

fn run_components(snapshot: &Snapshot, _params: &Params) -> Result<Value, ReportError> {
    let rows: Vec<Value> = snapshot
        .components()
        .map(|c| {
            json!({
                "key": c.key,
                "name": c.name,
                "satisfactions": c.satisfactions.len(),
            })
        })
        .collect();
    Ok(json!(rows))
}

fn run_controls(snapshot: &Snapshot, params: &Params) -> Result<Value, ReportError> {
    let filter = standard_filter("controls", snapshot, params)?;
    let mut rows = Vec::new();
    for standard in snapshot.standards() {
        if filter.is_some_and(|f| f != standard.key) {
            continue;
        }
        for control in standard.controls.values() {
            let family = family_of(&control.key);
            rows.push(json!({
                "standard": standard.key,
                "control": control.key,
                "name": control.name,
                "family": family,
            }));
        }
    }
    Ok(json!(rows))
}

fn run_controls_by_status(snapshot: &Snapshot, params: &Params) -> Result<Value, ReportError> {
    // `run` validated presence; parse the value here.
    let raw = params.get("status").map(String::as_str).unwrap_or_default();
    let wanted: Status = raw
        .parse()
        .map_err(|_| ReportError::UnknownParameterValue {
            report: "controls-by-status".to_string(),
            name: "status".to_string(),
            value: raw.to_string(),
        })?;
    let filter = standard_filter("controls-by-status", snapshot, params)?;

    let mut rows = Vec::new();
    for component in snapshot.components() {
        for sat in &component.satisfactions {
            if sat.parsed_status() != Some(wanted) {
                continue;
            }
            if filter.is_some_and(|f| f != sat.standard_key) {
                continue;
            }
            rows.push(json!({
                "standard": sat.standard_key,
                "control": sat.control_key,
                "component": component.key,
                "status": sat.status,
            }));
        }
    }
    rows.sort_by(|a, b| {
        let key = |v: &Value| {
            (
                v["standard"].as_str().unwrap_or_default().to_string(),
                v["control"].as_str().unwrap_or_default().to_string(),
                v["component"].as_str().unwrap_or_default().to_string(),
            )
        };
        key(a).cmp(&key(b))
    });
    Ok(json!(rows))
}

fn run_coverage(snapshot: &Snapshot, params: &Params) -> Result<Value, ReportError> {
    let filter = standard_filter("coverage", snapshot, params)?;
    let satisfied: std::collections::BTreeSet<(&str, &str)> = snapshot
        .components()
        .flat_map(|c| {
            c.satisfactions
                .iter()
                .map(|s| (s.standard_key.as_str(), s.control_key.as_str()))
        })
        .collect();

    let mut rows = Vec::new();
    for standard in snapshot.standards() {
        if filter.is_some_and(|f| f != standard.key) {
            continue;
        }
        let unsatisfied: Vec<&str> = standard
            .controls
            .keys()
            .filter(|ck| !satisfied.contains(&(standard.key.as_str(), ck.as_str())))
            .map(String::as_str)
            .collect();
        rows.push(json!({
            "standard": standard.key,
            "controls": standard.controls.len(),
            "satisfied": standard.controls.len() - unsatisfied.len(),
            "unsatisfied": unsatisfied,
        }));
    }
    Ok(json!(rows))
}

fn run_certification(snapshot: &Snapshot, params: &Params) -> Result<Value, ReportError> {
    let key = params
        .get("certification")
        .map(String::as_str)
        .unwrap_or_default();
    let certification =
        snapshot
            .certification(key)
            .ok_or_else(|| ReportError::UnknownParameterValue {
                report: "certification".to_string(),
                name: "certification".to_string(),
                value: key.to_string(),
            })?;

    let mut standards = Vec::new();
    let mut missing = Vec::new();
    for standard_key in &certification.standards {
        let Some(standard) = snapshot.standard(standard_key) else {
            missing.push(standard_key.clone());
            continue;
        };
        let mut controls = serde_json::Map::new();
        for control_key in standard.controls.keys() {
            let satisfiers: Vec<&str> = snapshot
                .components()
                .filter(|c| {
                    c.satisfactions.iter().any(|s| {
                        s.standard_key == *standard_key && s.control_key == *control_key
                    })
                })
                .map(|c| c.key.as_str())
                .collect();
            controls.insert(control_key.clone(), json!(satisfiers));
        }
        standards.push(json!({
            "standard": standard.key,
            "name": standard.name,
            "controls": controls,
        }));
    }

    Ok(json!({
        "certification": certification.key,
        "name": certification.name,
        "standards": standards,
        "missing_standards": missing,
    }))
}
