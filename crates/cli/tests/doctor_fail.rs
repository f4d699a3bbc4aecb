use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn doctor_fails_when_config_missing() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jot"));
    cmd.env("XDG_CONFIG_HOME", tmp.path()); // empty dir → no config
    cmd.arg("doctor");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAIL jot doctor"))
        .stdout(predicate::str::contains("looked for:"));
}

#[test]
fn doctor_fails_on_unreadable_log() {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(&cfg, "version = 1\n[profiles.default]\nlog_file = \"{{config_dir}}/log.json\"\n")
        .unwrap();
    fs::write(tmp.path().join("log.json"), "[{ broken").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jot"));
    cmd.args(["doctor", "--config", cfg.to_str().unwrap()]);
    cmd.assert().failure().stdout(predicate::str::contains("FAIL failed to parse log file"));
}
