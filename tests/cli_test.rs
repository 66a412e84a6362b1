use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;
use common::write_script;

#[test]
fn test_cli_end_to_end() {
    let script = write_script(&[
        "register alice",
        "register bob",
        "login alice",
        "deposit 500",
        "transfer bob 200",
        "balance",
        "logout",
        "login bob",
        "list_pending",
        "accept_transfer alice 200",
        "balance",
        "list_pending",
    ]);

    let mut cmd = Command::new(cargo_bin!("p2p-ledger"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Account alice registered"))
        .stdout(predicate::str::contains("Deposited 500.00 to alice"))
        .stdout(predicate::str::contains(
            "Transfer #1 of 200.00 from alice to bob is pending",
        ))
        .stdout(predicate::str::contains("Balance for alice is 300.00"))
        .stdout(predicate::str::contains("#1 from alice: 200.00"))
        .stdout(predicate::str::contains("Accepted #1 of 200.00 from alice"))
        .stdout(predicate::str::contains("Balance for bob is 200.00"))
        .stdout(predicate::str::contains("No pending transfers for bob"));
}

#[test]
fn test_cli_reports_errors_and_continues() {
    let script = write_script(&[
        "register alice",
        "register alice",
        "deposit alice 10",
        "login alice",
        "fly away",
        "deposit ten",
        "withdraw 5",
        "deposit 10000.01",
        "deposit 25",
        "withdraw 25.01",
        "balance",
    ]);

    let mut cmd = Command::new(cargo_bin!("p2p-ledger"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Error processing command: account alice already exists",
        ))
        .stderr(predicate::str::contains(
            "Error processing command: no one is logged in",
        ))
        .stderr(predicate::str::contains(
            "Error reading command: invalid input: unknown command 'fly'",
        ))
        .stderr(predicate::str::contains("is not a decimal amount"))
        .stderr(predicate::str::contains("insufficient funds"))
        .stderr(predicate::str::contains("invalid amount 10000.01"))
        .stdout(predicate::str::contains("Balance for alice is 25.00"));
}

#[test]
fn test_cli_summary_and_max_amount() {
    let script = write_script(&[
        "register alice",
        "register bob",
        "login alice",
        "deposit 100",
        "deposit 100.01",
        "transfer bob 40",
    ]);

    let mut cmd = Command::new(cargo_bin!("p2p-ledger"));
    cmd.arg(script.path())
        .arg("--max-amount")
        .arg("100")
        .arg("--summary");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("invalid amount 100.01"))
        .stdout(predicate::str::contains(
            "name,balance,pending_in,pending_out",
        ))
        .stdout(predicate::str::contains("alice,60.00,0.00,40.00"))
        .stdout(predicate::str::contains("bob,0.00,40.00,0.00"));
}

#[test]
fn test_cli_rejects_non_positive_max_amount() {
    let script = write_script(&["register alice"]);

    let mut cmd = Command::new(cargo_bin!("p2p-ledger"));
    cmd.arg(script.path()).arg("--max-amount").arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--max-amount must be positive"));
}

#[test]
fn test_cli_reads_stdin() {
    assert_cmd::Command::new(cargo_bin!("p2p-ledger"))
        .write_stdin("register alice\nlogin alice\nlogs\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logs for alice:\nAccount registered"));
}
