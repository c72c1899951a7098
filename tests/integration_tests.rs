use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const PAGE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/starchart.toml");
const NOW: &str = "2026-10-16T09:00:00Z";

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("starchart-customizer");
    cmd.env_remove("STARCHART_LOG");
    cmd
}

fn page_cmd() -> Command {
    let mut cmd = cmd();
    cmd.args(["--page", PAGE, "--now", NOW]);
    cmd
}

#[test]
fn test_cli_reports_initial_variant() {
    page_cmd()
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("variant: adaptive"))
        .stdout(predicate::str::contains(
            "url: https://starchart.cc/caarlos0/starcharts.svg?variant=adaptive",
        ))
        .stdout(predicate::str::contains("group variant: -"))
        .stdout(predicate::str::contains("time: 3 days ago"))
        .stdout(predicate::str::contains("preview loads: 1"));
}

#[test]
fn test_cli_yaml_is_default() {
    page_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("variant: adaptive"))
        .stdout(predicate::str::contains("highlighted:"))
        .stdout(predicate::str::contains("customisation_open: false"));
}

#[test]
fn test_cli_custom_colors_in_query() {
    page_cmd()
        .args([
            "--format",
            "text",
            "-e",
            "click:variant/custom",
            "-e",
            "color:line=#ff0000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "?background=%23FFFFFF&axis=%23333333&line=%23ff0000",
        ))
        .stdout(predicate::str::contains("group variant: Custom"))
        .stdout(predicate::str::contains("customisation: open"));
}

#[test]
fn test_cli_json_output() {
    let output = page_cmd()
        .args(["--format", "json", "-e", "click:variant/dark"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["variant"], "dark");
    assert_eq!(
        report["url"],
        "https://starchart.cc/caarlos0/starcharts.svg?variant=dark"
    );
    assert_eq!(report["active"]["variant"], "Dark");
    assert_eq!(report["preview_loads"], 2);
}

#[test]
fn test_cli_storage_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let storage = storage.to_str().unwrap();

    page_cmd()
        .args(["--storage", storage, "-e", "color:background=#101010"])
        .assert()
        .success();

    page_cmd()
        .args(["--storage", storage, "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("color background: #101010"))
        .stdout(predicate::str::contains("variant: adaptive"));
}

#[test]
fn test_cli_copy_confirmation_and_restore() {
    page_cmd()
        .args(["--format", "text", "-e", "copy:copy-snippet", "-e", "wait:500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trigger copy-snippet: Copied!"));

    page_cmd()
        .args([
            "--format",
            "text",
            "-e",
            "copy:copy-snippet",
            "-e",
            "wait:1000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("trigger copy-snippet: Copy"));
}

#[test]
fn test_cli_base_url_override() {
    page_cmd()
        .args([
            "--format",
            "text",
            "--base-url",
            "https://example.com/chart.svg?stale=1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "url: https://example.com/chart.svg?variant=adaptive",
        ));
}

#[test]
fn test_cli_rejects_malformed_event() {
    page_cmd()
        .args(["-e", "hover:chart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid event"));
}

#[test]
fn test_cli_rejects_unknown_group() {
    page_cmd()
        .args(["-e", "click:size/large"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown button group 'size'"));
}

#[test]
fn test_cli_missing_page_fails() {
    cmd()
        .args(["--page", "/nonexistent/page.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn test_cli_print_config() {
    page_cmd()
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"base_url = "/caarlos0/starcharts.svg""#,
        ))
        .stdout(predicate::str::contains(r#"close_label = "Apply""#));
}

#[test]
fn test_cli_stylesheet() {
    cmd()
        .args(["--stylesheet", "InspiredGitHub"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".hl-"));

    cmd()
        .args(["--stylesheet", "no-such-theme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown theme"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("starchart-customizer"));
}

#[test]
fn test_cli_requires_page() {
    cmd().assert().failure();
}
