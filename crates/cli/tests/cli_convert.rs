use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../core/tests/fixtures/relu")
}

/// A full run prints the step-by-step progress and writes both files into a
/// freshly created output directory.
#[test]
fn convert_writes_outputs_and_reports_progress() {
    let tmp = tempdir().expect("tempdir");
    let out_dir = tmp.path().join("generated/relu");

    cargo_bin_cmd!("testport")
        .arg(fixture_dir())
        .arg(&out_dir)
        .arg("relu")
        .assert()
        .success()
        .stdout(predicate::str::contains("Converting relu operator..."))
        .stdout(predicate::str::contains("  - Triton: relu_triton.py"))
        .stdout(predicate::str::contains("  - Baseline: relu_baseline.py"))
        .stdout(predicate::str::contains("  - Accuracy test: test_relu_accuracy.py"))
        .stdout(predicate::str::contains("  - Performance test: test_relu_performance.py"))
        .stdout(predicate::str::contains("✓ Generated:"))
        .stdout(predicate::str::contains("✓ Conversion complete!"));

    assert!(out_dir.join("relu.py").exists());
    let test = fs::read_to_string(out_dir.join("relu_test.py")).expect("read test module");
    assert!(test.contains("@pytest.mark.relu"));
    assert!(test.contains("def test_relu_performance(shape, dtype):"));
}

/// Fewer than four inputs is a classification failure: exit 1, message on
/// stderr, nothing written.
#[test]
fn convert_fails_for_three_inputs() {
    let tmp = tempdir().expect("tempdir");
    let input = tmp.path().join("in");
    let out_dir = tmp.path().join("out");
    fs::create_dir_all(&input).unwrap();
    for name in ["relu_triton.py", "relu_baseline.py", "test_relu_accuracy.py"] {
        fs::copy(fixture_dir().join(name), input.join(name)).unwrap();
    }

    cargo_bin_cmd!("testport")
        .arg(&input)
        .arg(&out_dir)
        .arg("relu")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Expected 4 input files"));

    assert!(!out_dir.exists());
}

/// Fatal errors reach stderr as a single line, even with backtraces enabled.
#[test]
fn convert_error_is_a_single_stderr_line() {
    let tmp = tempdir().expect("tempdir");

    let assert = cargo_bin_cmd!("testport")
        .env("RUST_BACKTRACE", "1")
        .arg(tmp.path().join("nope"))
        .arg(tmp.path().join("out"))
        .arg("relu")
        .assert()
        .failure()
        .code(1);

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf-8 stderr");
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "stderr was: {stderr}");
    assert!(lines[0].starts_with("Error: Failed to read input directory"), "stderr was: {stderr}");
}

#[test]
fn convert_rejects_invalid_operator_name() {
    let tmp = tempdir().expect("tempdir");

    cargo_bin_cmd!("testport")
        .arg(fixture_dir())
        .arg(tmp.path().join("out"))
        .arg("relu-op")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid operator name 'relu-op'"));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn convert_requires_three_positional_arguments() {
    cargo_bin_cmd!("testport").arg("only-one").assert().failure();
}

/// `--json` prints only the report on stdout, and the kernel digests match.
#[test]
fn convert_json_report_is_parseable() {
    let tmp = tempdir().expect("tempdir");
    let out_dir = tmp.path().join("out");

    let assert = cargo_bin_cmd!("testport")
        .arg(fixture_dir())
        .arg(&out_dir)
        .arg("relu")
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("report json");
    assert_eq!(report["operator"], "relu");
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["positional_guess"], false);
    assert_eq!(report["roles"].as_array().map(|r| r.len()), Some(4));
    assert_eq!(report["roles"][0]["role"], "kernel");
    assert_eq!(report["kernel_input_sha256"], report["kernel_output_sha256"]);
    assert_eq!(report["outputs"].as_array().map(|o| o.len()), Some(2));
}

#[test]
fn convert_dry_run_writes_nothing() {
    let tmp = tempdir().expect("tempdir");
    let out_dir = tmp.path().join("out");

    cargo_bin_cmd!("testport")
        .arg(fixture_dir())
        .arg(&out_dir)
        .arg("relu")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would generate:"))
        .stdout(predicate::str::contains("no files written"));

    assert!(!out_dir.exists());
}

#[test]
fn convert_honours_config_file() {
    let tmp = tempdir().expect("tempdir");
    let out_dir = tmp.path().join("out");
    let config = tmp.path().join("convert.json");
    fs::write(&config, r#"{ "rtol": 0.01, "atol": 0.0001 }"#).unwrap();

    cargo_bin_cmd!("testport")
        .arg(fixture_dir())
        .arg(&out_dir)
        .arg("relu")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let test = fs::read_to_string(out_dir.join("relu_test.py")).unwrap();
    assert!(test.contains("rtol=1e-2, atol=1e-4"), "tolerances not applied:\n{test}");
}

#[test]
fn convert_fails_for_corrupt_config() {
    let tmp = tempdir().expect("tempdir");
    let config = tmp.path().join("convert.json");
    fs::write(&config, "not-json").unwrap();

    cargo_bin_cmd!("testport")
        .arg(fixture_dir())
        .arg(tmp.path().join("out"))
        .arg("relu")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse convert config JSON"));
}
