use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

const LOG: &str = r#"[
  {"id": "1", "start_time": "2023-01-01T09:00:00", "title": "Planning session"},
  {"id": "2", "start_time": "2023-01-02T09:00:00", "title": "Pair on the new parser"},
  {"id": "3", "start_time": "2023-01-03T09:00:00", "title": "Read about parsers and lexers"}
]"#;

fn setup(search: &str) -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(
        &cfg,
        format!(
            "version = 1\n[profiles.default]\nlog_file = \"{{{{config_dir}}}}/log.json\"\n\n[search]\n{search}\n"
        ),
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

fn quiet_lines(cmd: &mut Command) -> Vec<String> {
    let out = cmd.args(["-o", "quiet"]).assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn search_filters_in_canonical_order() {
    let (_tmp, cfg) = setup("");
    let got = quiet_lines(jot(&cfg).args(["search", "parser"]));
    assert_eq!(got, vec!["Read about parsers and lexers", "Pair on the new parser"]);
}

#[test]
fn search_respects_configured_fuzzy_matching() {
    let (_tmp, cfg) = setup("matching = \"fuzzy\"");
    let got = quiet_lines(jot(&cfg).args(["search", "plng"]));
    assert_eq!(got, vec!["Planning session"]);
}

#[test]
fn search_rank_orders_by_score() {
    let (_tmp, cfg) = setup("");
    let got = quiet_lines(jot(&cfg).args(["search", "--rank", "pa"]));
    assert_eq!(
        got,
        vec!["Pair on the new parser", "Read about parsers and lexers", "Planning session"]
    );
}

#[test]
fn search_count_limits_output() {
    let (_tmp, cfg) = setup("");
    let got = quiet_lines(jot(&cfg).args(["search", "parser", "-n", "1"]));
    assert_eq!(got, vec!["Read about parsers and lexers"]);
}

#[cfg(unix)]
#[test]
fn search_rank_with_external_command() {
    let (_tmp, cfg) = setup("ranker = \"grep -i\"");
    let got = quiet_lines(jot(&cfg).args(["search", "--rank", "LEXER"]));
    assert_eq!(got, vec!["Read about parsers and lexers"]);
}

#[cfg(unix)]
#[test]
fn search_rank_external_no_match() {
    let (_tmp, cfg) = setup("ranker = \"grep\"");
    jot(&cfg)
        .args(["search", "--rank", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no entries found)"));
}

#[test]
fn search_rank_missing_program_fails() {
    let (_tmp, cfg) = setup("ranker = \"jot-no-such-ranker-binary\"");
    jot(&cfg)
        .args(["search", "--rank", "parser"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error running ranker"));
}
