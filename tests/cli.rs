//! Binary Startup Tests
//!
//! Runs the compiled binary to check argument handling and the fatal
//! connection path. No database server is needed: the PostgreSQL case
//! targets a port nothing listens on.

use assert_cmd::Command;
use predicates::prelude::*;

fn shop() -> Command {
    Command::cargo_bin("mechanic-shop").unwrap()
}

#[test]
fn test_wrong_argument_count_prints_usage() {
    shop()
        .args(["shopdb", "5432"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_non_numeric_port_is_rejected() {
    shop().args(["shopdb", "fifty", "admin"]).assert().failure();
}

#[cfg(feature = "postgres")]
#[test]
fn test_unreachable_server_exits_before_menu() {
    shop()
        .args(["shopdb", "1", "admin", "--host", "127.0.0.1"])
        .write_stdin("11\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Connection URL: postgresql://127.0.0.1:1/shopdb"))
        .stdout(predicate::str::contains("Make sure you started postgres on this machine"))
        .stdout(predicate::str::contains("MAIN MENU").not())
        .stderr(predicate::str::contains("Error - Unable to Connect to Database"));
}

#[cfg(feature = "sqlite")]
#[test]
fn test_sqlite_session_runs_menu_until_exit() {
    shop()
        .args([":memory:", "0", "nobody", "--engine", "sqlite"])
        .write_stdin("oops\n11\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Connection URL: sqlite://:memory:"))
        .stdout(predicate::str::contains("MAIN MENU"))
        .stdout(predicate::str::contains("Your input is invalid!"))
        .stdout(predicate::str::ends_with("Disconnecting from database...Done\n\nBye !\n"));
}

#[cfg(feature = "sqlite")]
#[test]
fn test_sqlite_session_ends_at_end_of_input() {
    shop()
        .args([":memory:", "0", "nobody", "--engine", "sqlite"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bye !"));
}

#[cfg(feature = "sqlite")]
#[test]
fn test_console_failure_is_reported_once() {
    shop()
        .args([":memory:", "0", "nobody", "--engine", "sqlite"])
        .write_stdin(&b"\xff\xfe\n"[..])
        .assert()
        .code(1)
        .stdout(predicate::str::ends_with("Bye !\n"))
        .stderr(predicate::function(|err: &str| err.matches("Console I/O error").count() == 1))
        .stderr(predicate::str::contains("Error:").not());
}
