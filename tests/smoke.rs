//! Smoke tests -- verify the binary runs and each view answers.

use assert_cmd::Command;
use std::io::Write;

const RECORDS: &str = r#"[
  { "id": "rs-1", "status": "passed", "stats": { "passes": 3, "failures": 0 }, "completedAt": "2018-01-02T10:00:00Z" },
  { "id": "rs-2", "status": "failed", "stats": { "passes": 0, "failures": 3 }, "completedAt": "2018-01-02T11:00:00Z" },
  { "id": "rs-3", "status": "passed", "stats": { "passes": 3, "failures": 0 }, "completedAt": "2018-01-02T12:00:00Z" }
]"#;

fn records_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RECORDS.as_bytes()).unwrap();
    file
}

fn runstats() -> Command {
    let mut cmd = Command::cargo_bin("runstats").unwrap();
    // keep stray config files out of the way
    cmd.env_remove("RUNSTATS_CONFIG");
    cmd
}

#[test]
fn test_cli_help() {
    runstats()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Availability buckets and status timelines"));
}

#[test]
fn test_cli_version() {
    runstats()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("runstats"));
}

#[test]
fn test_buckets_subcommand_exists() {
    runstats().args(["buckets", "--help"]).assert().success();
}

#[test]
fn test_summary_json() {
    let file = records_file();
    runstats()
        .arg("summary")
        .arg("--input")
        .arg(file.path())
        .args(["--now", "2018-01-02T13:00:00Z", "--json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("\"latestStatus\""))
        .stdout(predicates::str::contains("\"latestDowntime\""))
        .stdout(predicates::str::contains("\"status\": \"down\""));
}

#[test]
fn test_buckets_text_table() {
    let file = records_file();
    runstats()
        .arg("buckets")
        .arg("--input")
        .arg(file.path())
        .args([
            "--size",
            "day",
            "--start",
            "2018-01-01T00:00:00Z",
            "--end",
            "2018-01-03T00:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicates::str::contains("2018-01-02T00:00:00Z"))
        .stdout(predicates::str::contains("66.67%"));
}

#[test]
fn test_rejects_unknown_bucket_size() {
    let file = records_file();
    runstats()
        .arg("buckets")
        .arg("--input")
        .arg(file.path())
        .args([
            "--size",
            "fortnight",
            "--start",
            "2018-01-01T00:00:00Z",
            "--end",
            "2018-01-03T00:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("unexpected bucket size"));
}

#[test]
fn test_incomplete_record_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"[{ "id": "rs-pending", "status": "running", "completedAt": null }]"#)
        .unwrap();
    runstats()
        .arg("timeline")
        .arg("--input")
        .arg(file.path())
        .args(["--start", "2018-01-01T00:00:00Z", "--end", "2018-01-03T00:00:00Z"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("rs-pending"));
}
