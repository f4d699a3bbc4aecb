use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

const LOG: &str = r#"[
  {"id": "1", "start_time": "2023-01-01T09:00:00", "title": "Standup @meeting @done(2023-01-01 09:30)", "section": "Work"},
  {"id": "2", "start_time": "2023-01-01T11:00:00", "title": "Write report @writing @project(alpha)", "section": "Work",
   "note": ["Called the client about scope"]},
  {"id": "3", "start_time": "2023-01-02T08:00:00", "title": "Buy groceries @errand", "section": "Home"},
  {"id": "4", "start_time": "2023-01-02T14:00:00", "title": "Review pull request @project(beta) @done(2023-01-02 15:15)", "section": "Work"}
]"#;

fn setup() -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(
        &cfg,
        "version = 1\nnever_finish = [\"@meeting\"]\n[profiles.default]\nlog_file = \"{{config_dir}}/log.json\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("log.json"), LOG).unwrap();
    (tmp, cfg)
}

fn jot(cfg: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jot"));
    cmd.arg("--config").arg(cfg);
    cmd
}

fn titles(cmd: &mut Command) -> Vec<String> {
    let out = cmd.args(["-o", "quiet"]).assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn show_lists_newest_first() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).arg("show"));
    assert_eq!(
        got,
        vec![
            "Review pull request @project(beta) @done(2023-01-02 15:15)",
            "Buy groceries @errand",
            "Write report @writing @project(alpha)",
            "Standup @meeting @done(2023-01-01 09:30)",
        ]
    );
}

#[test]
fn show_oldest_slice_in_ascending_order() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--age", "oldest", "-n", "2", "--asc"]));
    assert_eq!(
        got,
        vec!["Standup @meeting @done(2023-01-01 09:30)", "Write report @writing @project(alpha)"]
    );
}

#[test]
fn show_filters_by_tag_and_section() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--section", "work", "--tag", "project"]));
    assert_eq!(got.len(), 2);
    assert!(got.iter().all(|t| t.contains("@project")));
}

#[test]
fn show_filters_by_value_query() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--val", "project == beta"]));
    assert_eq!(got, vec!["Review pull request @project(beta) @done(2023-01-02 15:15)"]);
}

#[test]
fn show_search_covers_notes() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--search", "client"]));
    assert_eq!(got, vec!["Write report @writing @project(alpha)"]);
}

#[test]
fn show_unfinished_respects_never_finish() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--unfinished"]));
    assert_eq!(got, vec!["Buy groceries @errand", "Write report @writing @project(alpha)"]);
}

#[test]
fn show_date_range() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--from", "2023-01-01"]));
    assert_eq!(got.len(), 2);
    assert!(got.iter().all(|t| !t.contains("groceries")));
}

#[test]
fn show_not_inverts() {
    let (_tmp, cfg) = setup();
    let got = titles(jot(&cfg).args(["show", "--tag", "project", "--not"]));
    assert_eq!(got, vec!["Buy groceries @errand", "Standup @meeting @done(2023-01-01 09:30)"]);
}

#[test]
fn show_json_output() {
    let (_tmp, cfg) = setup();
    let out = jot(&cfg).args(["show", "--json", "--tag", "meeting"]).assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "1");
    assert_eq!(items[0]["duration_secs"], 1800);
    assert_eq!(items[0]["end"], "2023-01-01 09:30");
}

#[test]
fn show_table_reports_count() {
    let (_tmp, cfg) = setup();
    jot(&cfg)
        .args(["show", "--section", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy groceries"))
        .stdout(predicate::str::contains("-- 1 entries --"));
}

#[test]
fn show_empty_result() {
    let (_tmp, cfg) = setup();
    jot(&cfg)
        .args(["show", "--tag", "nonexistent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no entries found)"));
}

#[test]
fn show_rejects_bad_value_query() {
    let (_tmp, cfg) = setup();
    jot(&cfg)
        .args(["show", "--val", "no operator here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
