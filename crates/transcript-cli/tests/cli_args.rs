use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("transcript").unwrap()
}

#[test]
fn help_flag_prints_usage_with_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("records"))
        .stdout(predicate::str::contains("prognosis"))
        .stdout(predicate::str::contains("distribution"))
        .stdout(predicate::str::contains("lines"));
}

#[test]
fn summary_subcommand_help() {
    cmd()
        .args(["summary", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--line-tolerance"))
        .stdout(predicate::str::contains("--excluded-section"))
        .stdout(predicate::str::contains("--target-credits"));
}

#[test]
fn records_subcommand_has_no_target_flag() {
    cmd()
        .args(["records", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--excluded-section"))
        .stdout(predicate::str::contains("--target-credits").not());
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcript"));
}

#[test]
fn missing_subcommand_fails() {
    cmd().assert().failure();
}

#[test]
fn missing_file_argument_fails() {
    cmd()
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE"));
}

#[test]
fn invalid_format_is_rejected() {
    cmd()
        .args(["records", "t.pdf", "--format", "xml"])
        .assert()
        .failure();
}

#[test]
fn invalid_section_is_rejected() {
    cmd()
        .args(["records", "t.pdf", "--excluded-section", "Z0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid section code"));
}

#[test]
fn file_not_found_exits_with_one() {
    cmd()
        .args(["summary", "/nonexistent/transcript.pdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("file not found"));
}
