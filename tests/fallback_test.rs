use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "http-client"))]
#[test]
fn test_http_client_fallback_warning() {
    let mut cmd = Command::new(cargo_bin!("checkout-engine"));
    cmd.arg("tests/fixtures/cart.csv")
        .args(["--form", "tests/fixtures/form.json"])
        .args(["--today", "2025-06-15"])
        .args(["--api-base", "http://localhost:9/api"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Storefront API requested via --api-base, but 'http-client' feature is not enabled. Falling back to in-memory collaborators."))
        .stdout(predicate::str::contains("ORD-0001"));
}

#[cfg(not(feature = "http-client"))]
#[test]
fn test_no_warning_without_api_base() {
    let mut cmd = Command::new(cargo_bin!("checkout-engine"));
    cmd.arg("tests/fixtures/cart.csv")
        .args(["--form", "tests/fixtures/form.json"])
        .args(["--today", "2025-06-15"])
        .env_remove("CHECKOUT_API_BASE");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}

#[cfg(feature = "http-client")]
#[test]
fn test_unreachable_api_fails_the_order() {
    let mut cmd = Command::new(cargo_bin!("checkout-engine"));
    cmd.arg("tests/fixtures/cart.csv")
        .args(["--form", "tests/fixtures/form.json"])
        .args(["--today", "2025-06-15"])
        .args(["--api-base", "http://127.0.0.1:9/api"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("WARNING: Storefront API").not());
}
