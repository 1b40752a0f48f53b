#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_plan(dir: &Path, name: &str, plan: Value) -> PathBuf {
    let path = dir.join(name);
    let document = json!([{ "Plan": plan }]);
    fs::write(&path, serde_json::to_string_pretty(&document).expect("encode")).expect("write plan");
    path
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let qep = write_plan(
        dir.path(),
        "qep.json",
        json!({"Node Type": "Seq Scan", "Total Cost": 100, "Plan Rows": 42,
               "Relation Name": "t", "Filter": "((name)::text = 'x'::text)"}),
    );
    let aqp = write_plan(
        dir.path(),
        "aqp.json",
        json!({"Node Type": "Index Scan", "Total Cost": 150, "Index Cond": "(id > 2)"}),
    );
    (dir, qep, aqp)
}

fn missing_config(dir: &TempDir) -> PathBuf {
    dir.path().join("no-config.toml")
}

#[test]
fn annotate_json_reports_insights() {
    let (dir, qep, aqp) = setup();
    let output = cargo_bin_cmd!("planlens")
        .env("PLANLENS_CONFIG", missing_config(&dir))
        .args(["--format", "json", "annotate", "--qep"])
        .arg(&qep)
        .arg("--aqp")
        .arg(&aqp)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");

    assert_eq!(json["alternatives"], 1);
    assert_eq!(
        json["insights"]["((name) = 'x')"][0],
        "AQP chooses to do Index Scan on (id > 2) that increases cost by 50"
    );
    let annotations = json["annotations"].as_array().expect("annotations");
    assert_eq!(annotations.len(), 1);
    assert!(annotations[0]
        .as_str()
        .expect("string")
        .ends_with("that increases cost by 50."));
}

#[test]
fn annotate_text_strips_markup_when_not_a_terminal() {
    let (dir, qep, aqp) = setup();
    let output = cargo_bin_cmd!("planlens")
        .env("PLANLENS_CONFIG", missing_config(&dir))
        .args(["annotate", "--qep"])
        .arg(&qep)
        .arg("--aqp")
        .arg(&aqp)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");

    assert!(text.contains("Annotations"));
    assert!(text.contains(
        "1. The Seq Scan operation performs a scan on relation t and then filtered with the condition ((name) = 'x')."
    ));
    assert!(!text.contains("<b>"));
    assert!(text.contains("Insights"));
}

#[test]
fn summary_counts_nodes() {
    let (dir, qep, _) = setup();
    let output = cargo_bin_cmd!("planlens")
        .env("PLANLENS_CONFIG", missing_config(&dir))
        .args(["--format", "json", "summary", "--plan"])
        .arg(&qep)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["node_count"], 1);
    assert_eq!(json["seq_scans"], 1);
    assert_eq!(json["plan_rows"], 42.0);
}

#[test]
fn config_file_strategy_is_used_and_overridable() {
    let (dir, qep, aqp) = setup();
    let config = dir.path().join("planlens.toml");
    fs::write(&config, "[align]\nstrategy = \"index\"\n").expect("write config");

    let from_file = cargo_bin_cmd!("planlens")
        .args(["--format", "json", "--config"])
        .arg(&config)
        .args(["annotate", "--qep"])
        .arg(&qep)
        .arg("--aqp")
        .arg(&aqp)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&from_file).expect("valid json");
    assert_eq!(json["strategy"], "index");

    let overridden = cargo_bin_cmd!("planlens")
        .args(["--format", "json", "--config"])
        .arg(&config)
        .args(["annotate", "--strategy", "structural", "--qep"])
        .arg(&qep)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&overridden).expect("valid json");
    assert_eq!(json["strategy"], "structural");
    assert_eq!(json["alternatives"], 0);
}

#[test]
fn invalid_config_strategy_fails() {
    let (dir, qep, _) = setup();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[align]\nstrategy = \"diagonal\"\n").expect("write config");

    let assert = cargo_bin_cmd!("planlens")
        .arg("--config")
        .arg(&config)
        .args(["annotate", "--qep"])
        .arg(&qep)
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("diagonal"));
}

#[test]
fn malformed_plan_file_fails() {
    let dir = TempDir::new().expect("tempdir");
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"[{"Plan": {"Total Cost": 1}}]"#).expect("write");

    let assert = cargo_bin_cmd!("planlens")
        .env("PLANLENS_CONFIG", missing_config(&dir))
        .args(["annotate", "--qep"])
        .arg(&bad)
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Node Type"));
}

#[test]
fn config_show_prints_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let output = cargo_bin_cmd!("planlens")
        .env("PLANLENS_CONFIG", missing_config(&dir))
        .args(["--format", "json", "config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["align"]["strategy"], "structural");
    assert_eq!(json["knobs"]["baseline"]["random_page_cost"], 4.0);
    assert_eq!(json["knobs"]["alternative"].as_array().map(Vec::len), Some(2));
}
