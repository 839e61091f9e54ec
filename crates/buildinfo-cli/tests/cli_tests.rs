//! Drives the `buildinfo` binary end to end.

use std::path::Path;
use std::process::{Command, Output};

use buildinfo_test_utils::config::TestConfigBuilder;
use buildinfo_test_utils::repo::{TestRepo, git_available};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

fn buildinfo(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildinfo"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run buildinfo")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "buildinfo failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Every derivable field supplied, so no git is needed.
const FULL_PROPS: [&str; 5] = [
    "-p",
    "buildVersion=v1.2.3",
    "commitSha=abc123",
    "commitTitle=Fix the thing",
    "commitStatus=clean",
];

#[test]
fn test_build_version_with_base_and_suffix() {
    let dir = TempDir::new().unwrap();
    let out = buildinfo(dir.path(), &["build-version", "-b", "v1.2.3", "-s", "rc1"]);
    assert_eq!(stdout(&out), "v1.2.3__rc1\n");

    let out = buildinfo(dir.path(), &["build-version", "--base", "v1.2.3"]);
    assert_eq!(stdout(&out), "v1.2.3\n");
}

#[test]
fn test_create_then_inspect() {
    let dir = TempDir::new().unwrap();
    let mut args = vec!["create", "--filePath", "out/info.json"];
    args.extend(FULL_PROPS);
    args.extend(["-p", "team=infra"]);

    let created = stdout(&buildinfo(dir.path(), &args));
    let record: Value = serde_json::from_str(&created).unwrap();
    assert_eq!(record["commitSha"], "abc123");
    assert_eq!(record["team"], "infra");
    assert!(record["buildId"].is_number());

    let inspected = stdout(&buildinfo(
        dir.path(),
        &["inspect", "--filePath", "out/info.json"],
    ));
    assert_eq!(inspected, created);
}

#[test]
fn test_create_with_docker_args() {
    let dir = TempDir::new().unwrap();
    let mut args = vec!["create", "-d", "--labelNamespace", "com.acme"];
    args.extend(FULL_PROPS);

    let line = stdout(&buildinfo(dir.path(), &args));
    assert!(line.starts_with("--label \"com.acme.buildinfo.buildId="));
    assert!(line.contains(r#"--label "com.acme.buildinfo.commitTitle=Fix the thing""#));
    assert!(dir.path().join("build-info.json").exists());
}

#[test]
fn test_docker_args_from_existing_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("build-info.json"),
        r#"{"buildId": 42, "commitSha": "abc", "commitTitle": null}"#,
    )
    .unwrap();

    let line = stdout(&buildinfo(dir.path(), &["docker-args"]));
    assert_eq!(
        line,
        "--label \"buildinfo.buildId=42\" --label \"buildinfo.commitSha=abc\" --label \"buildinfo.commitTitle=null\"\n"
    );
}

#[test]
fn test_missing_record_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let inspect = buildinfo(dir.path(), &["inspect"]);
    assert_eq!(stdout(&inspect), "");
    assert!(String::from_utf8_lossy(&inspect.stderr).contains("not found"));

    let args = buildinfo(dir.path(), &["docker-args", "--filePath", "nope.json"]);
    assert_eq!(stdout(&args), "");
}

#[test]
fn test_corrupt_record_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("build-info.json"), "not json").unwrap();

    let out = buildinfo(dir.path(), &["inspect"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not a valid JSON object"));
}

#[test]
fn test_from_labels_decodes_namespace() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("labels.json"),
        r#"{"acme.buildinfo.commitSha": "abc", "unrelated.tool.foo": "bar"}"#,
    )
    .unwrap();

    let out = stdout(&buildinfo(
        dir.path(),
        &["from-labels", "--input", "labels.json", "--labelNamespace", "acme"],
    ));
    assert_eq!(out, "{\n  \"commitSha\": \"abc\"\n}\n");
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TestConfigBuilder::new()
        .file_path("meta/info.json")
        .namespace("org.example")
        .to_toml();
    std::fs::write(dir.path().join("buildinfo.toml"), config).unwrap();

    let mut args = vec!["create", "--dockerArgs"];
    args.extend(FULL_PROPS);
    let line = stdout(&buildinfo(dir.path(), &args));

    assert!(dir.path().join("meta/info.json").exists());
    assert!(line.contains("org.example.buildinfo.commitSha=abc123"));
}

#[test]
fn test_config_git_binary_is_used_for_derivation() {
    let dir = TempDir::new().unwrap();
    let config = TestConfigBuilder::new()
        .git_bin("/nonexistent/git")
        .repo_dir(".")
        .log_level("info")
        .to_toml();
    std::fs::write(dir.path().join("buildinfo.toml"), config).unwrap();

    let out = buildinfo(dir.path(), &["create"]);
    assert!(!out.status.success());
    assert!(!dir.path().join("build-info.json").exists());

    // Fully supplied records never reach git.
    let mut args = vec!["create"];
    args.extend(FULL_PROPS);
    stdout(&buildinfo(dir.path(), &args));
    assert!(dir.path().join("build-info.json").exists());
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("custom.toml"), "[logging]\nlevel = \"loud\"\n").unwrap();

    let out = buildinfo(dir.path(), &["--config", "custom.toml", "inspect"]);
    assert!(!out.status.success());
}

#[test]
fn test_malformed_prop_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let out = buildinfo(dir.path(), &["create", "-p", "novalue"]);
    assert!(!out.status.success());
    assert!(!dir.path().join("build-info.json").exists());
}

#[test]
fn test_create_in_tagged_repository() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::tagged("v2.0.0", "Release two\n\nNotes.");
    let version = stdout(&buildinfo(repo.path(), &["build-version", "-s", "42"]));
    assert_eq!(version, "v2.0.0__42\n");

    let created = stdout(&buildinfo(repo.path(), &["create"]));
    let record: Value = serde_json::from_str(&created).unwrap();

    assert_eq!(record["buildVersion"], "v2.0.0");
    assert_eq!(record["commitSha"], Value::String(repo.head()));
    assert_eq!(record["commitTitle"], "Release two");
    assert_eq!(record["commitStatus"], "clean");
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    let out = stdout(&buildinfo(dir.path(), &["-v"]));
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
}
