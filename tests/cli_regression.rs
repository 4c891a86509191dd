// Regression tests for the command-line runner, driven through the demo suite.
// Requires: assert_cmd, predicates crates in [dev-dependencies]
#![cfg(feature = "enable")]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn demo() -> Command {
    let mut cmd = Command::cargo_bin("trellis_demo").unwrap();
    cmd.env_remove("TRELLIS_PARTITIONS")
        .env_remove("TRELLIS_PARTITION")
        .arg("--color")
        .arg("never");
    cmd
}

#[test]
fn cli_passing_group_exits_zero() {
    demo()
        .args(["--tag", "[encoding]", "--all"])
        .assert()
        .success()
        .stdout(contains("Running 1 out of 1 test\n"))
        .stdout(contains("Passed: [encoding] UTF-8 <-> UTF-32 (trellis_demo.rs:"))
        .stdout(contains("tests:       1 total |     1 passed |     0 failed"));
}

#[test]
fn cli_required_failure_shows_captured_output() {
    demo()
        .args(["--tag", "[basic] require"])
        .assert()
        .code(1)
        .stdout(contains(
            "Require failed: arithmetic is broken\n    1 + 1 == 3 == true\n==> false == true\nAt trellis_demo.rs:",
        ))
        .stdout(contains("  In: [basic] require stops the test (trellis_demo.rs:"))
        .stdout(contains("Captured output:\nreached before the failure\n"))
        .stdout(contains("never printed").not());
}

#[test]
fn cli_output_flag_passes_prints_through() {
    demo()
        .args(["--tag", "[subtests] stack", "-o"])
        .assert()
        .success()
        .stdout(contains("begin\n1\n1.1\n\n"))
        .stdout(contains("begin\n2\n2.2\n2.2.1\n2.2.1.2\n\n"))
        .stdout(contains("begin\n2\n2.4\n\n"));
}

#[test]
fn cli_panic_does_not_stop_the_run() {
    demo()
        .args(["--tag", "[panic]"])
        .assert()
        .code(2)
        .stdout(contains("Require failed: assertion failed via panic\n"))
        .stdout(contains("std assertions unwind"))
        .stdout(contains("  In: [panic] later tests still run"))
        .stderr(contains("panicked at").not());
}

#[test]
fn cli_stop_flag_halts_after_first_failure() {
    demo()
        .args(["--tag", "[panic]", "-s"])
        .assert()
        .code(1)
        .stdout(contains("[panic] later tests still run").not())
        .stdout(contains("tests:       1 total"));
}

#[test]
fn cli_partition_header() {
    demo()
        .args(["--tag", "[basic]", "-p", "3", "-n", "2", "--all"])
        .assert()
        .code(1)
        .stdout(contains("Running 1 out of 3 tests\n(Partition 2: tests 1 to 1)\n"))
        .stdout(contains("Require failed: arithmetic is broken").not());
}

#[test]
fn cli_partition_from_environment() {
    demo()
        .args(["--tag", "[basic]"])
        .env("TRELLIS_PARTITIONS", "3")
        .env("TRELLIS_PARTITION", "3")
        .assert()
        .code(1)
        .stdout(contains("(Partition 3: tests 2 to 2)"))
        .stdout(contains("Require failed: arithmetic is broken"));
}

#[test]
fn cli_reports_miette_diagnostics_on_bad_partition() {
    demo()
        .args(["--tag", "[basic]", "-p", "5"])
        .assert()
        .failure()
        .stdout(contains("Running").not())
        .stderr(contains("trellis::partition::count").and(contains(
            "Invalid number of partitions 5, value should be between 1 and 3",
        )));
}

#[test]
fn cli_reports_empty_selection() {
    demo()
        .args(["--tag", "no such test"])
        .assert()
        .failure()
        .stderr(contains("trellis::registry::empty"));
}

#[test]
fn cli_full_suite_exit_code_counts_failures() {
    demo()
        .assert()
        .code(6)
        .stdout(contains("Running 9 out of 9 tests\n"))
        .stdout(contains("tests:       9 total |     3 passed |     6 failed"));
}
