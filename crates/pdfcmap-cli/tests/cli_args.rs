use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("pdfcmap").unwrap()
}

#[test]
fn help_flag_prints_usage_with_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("predefined"))
        .stdout(predicate::str::contains("tounicode"));
}

#[test]
fn version_flag_prints_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pdfcmap"));
}

#[test]
fn info_subcommand_help() {
    cmd()
        .args(["info", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE"))
        .stdout(predicate::str::contains("--simple"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--max-range-len"));
}

#[test]
fn decode_subcommand_help() {
    cmd()
        .args(["decode", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--hex"))
        .stdout(predicate::str::contains("--assets"));
}

#[test]
fn predefined_subcommand_help() {
    cmd()
        .args(["predefined", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME"))
        .stdout(predicate::str::contains("--assets"));
}

#[test]
fn no_subcommand_fails() {
    cmd().assert().failure();
}

#[test]
fn unknown_subcommand_fails() {
    cmd()
        .arg("glyphs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn invalid_format_value_fails() {
    cmd()
        .args(["info", "a.cmap", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
