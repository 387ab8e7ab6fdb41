use assert_cmd::Command;
use predicates::prelude::*;

/// Startup without the required environment variables must fail fast with
/// guidance instead of serving with a broken client.
#[test]
fn missing_configuration_is_a_fatal_startup_error() {
    let mut cmd = Command::cargo_bin("powerschool-mcp-server").unwrap();
    cmd.env_remove("POWERSCHOOL_URL")
        .env_remove("POWERSCHOOL_CLIENT_ID")
        .env_remove("POWERSCHOOL_CLIENT_SECRET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("POWERSCHOOL_URL"));
}

#[test]
fn invalid_base_url_is_rejected_at_startup() {
    let mut cmd = Command::cargo_bin("powerschool-mcp-server").unwrap();
    cmd.env("POWERSCHOOL_URL", "not a url")
        .env("POWERSCHOOL_CLIENT_ID", "test-client-id")
        .env("POWERSCHOOL_CLIENT_SECRET", "test-client-secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid PowerSchool URL"));
}

#[test]
fn partial_configuration_is_also_fatal() {
    let mut cmd = Command::cargo_bin("powerschool-mcp-server").unwrap();
    cmd.env("POWERSCHOOL_URL", "https://sis.example.test")
        .env("POWERSCHOOL_CLIENT_ID", "test-client-id")
        .env_remove("POWERSCHOOL_CLIENT_SECRET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("POWERSCHOOL_CLIENT_SECRET"));
}
