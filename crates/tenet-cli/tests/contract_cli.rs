//! Contract tests for the tenet CLI: exit codes, listing mode, parameter
//! parsing, and document output behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn tenet() -> Command {
    Command::cargo_bin("tenet").unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small valid artifact tree: one standard, one clean component.
fn seed_clean(root: &Path) {
    write(
        root,
        "artifacts/standards/NIST-800-53.yaml",
        r#"
name: NIST SP 800-53
families:
  AC: { name: Access Control }
controls:
  AC-2: { name: Account Management }
"#,
    );
    write(
        root,
        "artifacts/components/app1.yaml",
        r#"
name: App One
satisfies:
  - standard: NIST-800-53
    control: AC-2
    narrative: Accounts are centrally managed.
    status: complete
"#,
    );
}

#[test]
fn report_without_id_lists_registry_and_exits_zero() {
    tenet()
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("controls-by-status"))
        .stdout(predicate::str::contains("coverage"));
}

#[test]
fn unknown_report_id_exits_two_with_listing() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    tenet()
        .current_dir(dir.path())
        .args(["report", "no-such-report", "-d", "artifacts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("report not defined"))
        .stdout(predicate::str::contains("available reports"));
}

#[test]
fn malformed_parameter_token_exits_two() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    tenet()
        .current_dir(dir.path())
        .args(["report", "components", "statuscomplete", "-d", "artifacts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("should be NAME=VALUE"));
}

#[test]
fn controls_by_status_scenario() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    tenet()
        .current_dir(dir.path())
        .args([
            "report",
            "controls-by-status",
            "status=complete",
            "-d",
            "artifacts",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("AC-2"))
        .stdout(predicate::str::contains("app1"));
}

#[test]
fn validate_clean_tree_exits_zero() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    tenet()
        .current_dir(dir.path())
        .args(["validate", "-d", "artifacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok:"));
}

#[test]
fn validate_reports_parse_failures_and_exits_one() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    write(dir.path(), "artifacts/components/broken.yaml", "name: [oops\n");
    tenet()
        .current_dir(dir.path())
        .args(["validate", "-d", "artifacts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("E_PARSE"));
}

#[test]
fn refcheck_clean_tree_exits_zero() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    tenet()
        .current_dir(dir.path())
        .args(["refcheck", "-d", "artifacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("all references resolve"));
}

#[test]
fn refcheck_flags_unknown_control_and_exits_one() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    write(
        dir.path(),
        "artifacts/components/app2.yaml",
        r#"
name: App Two
satisfies:
  - standard: NIST-800-53
    control: AC-99
    narrative: Undefined control.
    status: partial
"#,
    );
    tenet()
        .current_dir(dir.path())
        .args(["refcheck", "-d", "artifacts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("E_UNKNOWN_CONTROL"))
        .stdout(predicate::str::contains("AC-99"));
}

#[test]
fn refcheck_unsatisfied_warnings_do_not_fail() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    write(
        dir.path(),
        "artifacts/standards/EXTRA.yaml",
        "name: Extra\ncontrols:\n  X-1: { name: Unclaimed }\n",
    );
    tenet()
        .current_dir(dir.path())
        .args(["refcheck", "--unsatisfied", "-d", "artifacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("W_UNSATISFIED_CONTROL"));
}

#[test]
fn missing_data_dir_exits_two() {
    let dir = tempdir().unwrap();
    tenet()
        .current_dir(dir.path())
        .args(["list", "-d", "nonexistent"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("data directory"));
}

#[test]
fn explicit_missing_config_exits_two() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    tenet()
        .current_dir(dir.path())
        .args(["list", "-c", "absent.yaml", "-d", "artifacts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn unknown_document_exits_two_without_output() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    let out = dir.path().join("out.md");
    tenet()
        .current_dir(dir.path())
        .args(["document", "nope", "-d", "artifacts"])
        .arg("--output")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("document not defined"));
    assert!(!out.exists(), "failed generation must not leave output behind");
}

#[test]
fn document_renders_to_output_file() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    write(dir.path(), "templates/ssp.md", "# {{document}}\n\n{{components}}\n");
    write(
        dir.path(),
        "tenet.yaml",
        r#"
data_dir: ./artifacts
documents:
  - id: ssp
    title: System Security Plan
    template: templates/ssp.md
    bindings:
      - name: components
        query: { type: all_components }
"#,
    );
    let out = dir.path().join("ssp.out.md");
    tenet()
        .current_dir(dir.path())
        .args(["document", "ssp", "-c", "tenet.yaml"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("app1"));
}

#[test]
fn unresolved_binding_exits_two() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    write(dir.path(), "templates/ssp.md", "{{gone}}\n");
    write(
        dir.path(),
        "tenet.yaml",
        r#"
data_dir: ./artifacts
documents:
  - id: ssp
    title: SSP
    template: templates/ssp.md
    bindings:
      - name: gone
        query: { type: component, key: no-such-component }
"#,
    );
    tenet()
        .current_dir(dir.path())
        .args(["document", "ssp", "-c", "tenet.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not resolve"));
}

#[test]
fn list_prints_artifacts_in_canonical_order() {
    let dir = tempdir().unwrap();
    seed_clean(dir.path());
    write(
        dir.path(),
        "artifacts/certifications/fisma-low.yaml",
        "name: FISMA Low\nstandards: [NIST-800-53]\n",
    );
    tenet()
        .current_dir(dir.path())
        .args(["list", "-d", "artifacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("standard       NIST-800-53"))
        .stdout(predicate::str::contains("certification  fisma-low"))
        .stdout(predicate::str::contains("component      app1"));
}
