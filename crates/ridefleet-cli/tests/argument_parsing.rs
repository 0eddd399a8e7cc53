//! Focused CLI argument parsing tests: verify argument handling without
//! requiring a running coordinator or region process.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_flag_shows_version() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ridefleet"));
}

#[test]
fn help_flag_shows_usage() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("handoff coordination"));
}

#[test]
fn no_command_shows_help() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn region_start_requires_name() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["region", "start"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn handoff_requires_ride_id() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["handoff", "--from", "us-west", "--to", "us-east"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn handoff_requires_from_and_to() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["handoff", "ride-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn invalid_transactions_limit_rejected() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["transactions", "--limit", "not-a-number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn unrecognized_command_shows_error() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized"));
}

#[test]
fn unrecognized_region_subcommand_shows_error() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["region", "invalid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized"));
}

#[test]
fn region_start_help_mentions_data_dir() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["region", "start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data-dir"));
}

#[test]
fn coordinator_start_default_address_shown_in_help() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["coordinator", "start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8080"));
}

#[test]
fn handoff_default_coordinator_shown_in_help() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["handoff", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:8080"));
}

#[test]
fn transactions_default_limit_shown_in_help() {
    Command::cargo_bin("ridefleet")
        .unwrap()
        .args(["transactions", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100"));
}
