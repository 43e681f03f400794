//! Integration tests for the `summary` and `prognosis` subcommands.

mod common;

use common::{cmd, sample_file, transcript_pdf, write_temp_pdf};
use predicates::prelude::*;

#[test]
fn summary_text_output() {
    let f = sample_file();
    cmd()
        .args(["summary", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bereich\tKurs\tNote\tECTS"))
        .stdout(predicate::str::contains(
            "A1\tMathematik für Informatiker\t1,3\t6,0",
        ))
        .stdout(predicate::str::contains("A5\tEthik\t2,0\t3,0\t*"))
        .stdout(predicate::str::contains(
            "Gesamte ECTS-Summe: 9.0 | Durchschnitt: 1.300",
        ))
        .stdout(predicate::str::contains("Aktuelle ECTS: 9.0"))
        .stdout(predicate::str::contains("Verbleibende ECTS: 171.0"))
        .stdout(predicate::str::contains(
            "Für Endnote 1.3 brauchst du Schnitt: 1.32",
        ));
}

#[test]
fn summary_json_output() {
    let f = sample_file();
    let output = cmd()
        .args(["summary", f.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 2);
    assert_eq!(json["records"][1]["excluded"], true);
    assert_eq!(json["totals"]["total_credit_weight"], 9.0);
    assert_eq!(json["totals"]["calc_credit_weight"], 6.0);
    assert_eq!(json["prognosis"]["rows"].as_array().unwrap().len(), 10);
    assert_eq!(json["excluded_section"], "A5");
}

#[test]
fn summary_excluded_section_flag() {
    let f = sample_file();
    cmd()
        .args([
            "summary",
            f.path().to_str().unwrap(),
            "--excluded-section",
            "A1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Gesamte ECTS-Summe: 9.0 | Durchschnitt: 2.000",
        ));
}

#[test]
fn summary_without_records() {
    let f = write_temp_pdf(&transcript_pdf(&["Leistungsübersicht"]));
    cmd()
        .args(["summary", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Gesamte ECTS-Summe: 0.0 | Durchschnitt: 0.000",
        ));
}

#[test]
fn orphan_line_warns_on_stderr() {
    let f = write_temp_pdf(&transcript_pdf(&["Vorkurs 1,0 2,0", "A1 Basis", "Logik 2,0 6,0"]));
    cmd()
        .args(["summary", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("ORPHAN_RECORD"))
        .stdout(predicate::str::contains("Gesamte ECTS-Summe: 6.0"));
}

#[test]
fn prognosis_text_output() {
    let f = sample_file();
    let output = cmd()
        .args(["prognosis", f.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("Für Endnote"))
        .collect();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[9], "Für Endnote 4.0 brauchst du Schnitt: 4.00");
}

#[test]
fn prognosis_target_credits_reached_has_no_rows() {
    let f = sample_file();
    cmd()
        .args(["prognosis", f.path().to_str().unwrap(), "--target-credits", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verbleibende ECTS: 0.0"))
        .stdout(predicate::str::contains("Für Endnote").not());
}

#[test]
fn prognosis_rejects_non_positive_target() {
    let f = sample_file();
    cmd()
        .args(["prognosis", f.path().to_str().unwrap(), "--target-credits", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("target credits"));
}

#[test]
fn negative_tolerance_is_rejected() {
    let f = sample_file();
    cmd()
        .args(["summary", f.path().to_str().unwrap(), "--line-tolerance", "-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line tolerance"));
}

#[test]
fn unreadable_pdf_exits_with_one() {
    let f = write_temp_pdf(b"this is not a pdf");
    cmd()
        .args(["summary", f.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to open PDF"));
}

#[test]
fn verbose_flag_logs_to_stderr() {
    let f = sample_file();
    cmd()
        .env_remove("RUST_LOG")
        .args(["summary", f.path().to_str().unwrap(), "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("extracted transcript"))
        .stderr(predicate::str::contains("interpreted page"));
}

#[test]
fn quiet_by_default() {
    let f = sample_file();
    cmd()
        .env_remove("RUST_LOG")
        .args(["summary", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
