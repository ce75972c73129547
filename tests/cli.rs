use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const DATA: &str = "Institution,Country,Funded\n\
UoA,Greece,Yes\n\
NTUA,Greece,No\n\
CU,Egypt,yes\n\
Sorbonne,France,no\n";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("pmap").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pmap"));
}

#[test]
fn show_prints_counts_and_writes_outputs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("proposals.csv");
    fs::write(&input, DATA).unwrap();
    let out = dir.path().join("filtered_counts.csv");
    let spec = dir.path().join("spec.json");

    let mut cmd = Command::cargo_bin("pmap").unwrap();
    cmd.args(["show", "--region", "emmena", "--chart", "bar", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .arg("--spec")
        .arg(&spec);
    cmd.assert()
        .success()
        .stdout(predicate::eq("Country,num_proposals\nEgypt,1\nGreece,2\n"))
        .stderr(predicate::str::contains("3 of 4 rows kept"));

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "Country,num_proposals\nEgypt,1\nGreece,2\n"
    );
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&spec).unwrap()).unwrap();
    assert_eq!(v["kind"], "bar");
    assert_eq!(v["bars"][0]["country"], "Egypt");
    assert_eq!(v["bars"][1]["country"], "Greece");
}

#[test]
fn show_rejects_missing_column() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "Country,Status\nGreece,Yes\n").unwrap();
    let mut cmd = Command::cargo_bin("pmap").unwrap();
    cmd.args(["show", "--input"]).arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Funded"));
}

#[test]
fn show_rejects_unknown_chart() {
    let mut cmd = Command::cargo_bin("pmap").unwrap();
    cmd.args(["show", "--input", "x.csv", "--chart", "pie"]);
    cmd.assert().failure();
}

#[test]
fn regions_lists_literal_tables() {
    let mut cmd = Command::cargo_bin("pmap").unwrap();
    cmd.args(["regions", "--region", "eu"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Czechia"))
        .stdout(predicate::str::contains("Czech Republic"));
}

#[test]
fn show_reads_xlsx_and_keeps_stdout_bytes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("proposals.xlsx");
    let mut wb = rust_xlsxwriter::Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "Country").unwrap();
    ws.write_string(0, 1, "Funded").unwrap();
    ws.write_string(1, 0, "Türkiye").unwrap();
    ws.write_string(1, 1, "Yes").unwrap();
    ws.write_string(2, 0, "Côte d'Ivoire").unwrap();
    ws.write_string(2, 1, "No").unwrap();
    wb.save(&input).unwrap();

    let mut cmd = Command::cargo_bin("pmap").unwrap();
    cmd.args(["show", "--input"]).arg(&input);
    let out = cmd.assert().success().get_output().stdout.clone();
    assert_eq!(
        out,
        "Country,num_proposals\nCôte d'Ivoire,1\nTürkiye,1\n".as_bytes()
    );
}
