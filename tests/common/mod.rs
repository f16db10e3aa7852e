//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a printdesk command
pub fn printdesk() -> Command {
    Command::new(cargo::cargo_bin!("printdesk"))
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    printdesk()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Helper to create a test filament, returning its full id
pub fn create_test_filament(tmp: &TempDir, title: &str, price_per_kilo: f64) -> String {
    let output = printdesk()
        .current_dir(tmp.path())
        .args([
            "fil",
            "new",
            "--title",
            title,
            "--brand",
            "Acme",
            "--price-per-kilo",
            &price_per_kilo.to_string(),
            "--format",
            "id",
        ])
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a single-priced test product, returning its full id
pub fn create_test_product(
    tmp: &TempDir,
    title: &str,
    parts: &[(&str, f64)],
    price: Option<f64>,
) -> String {
    let mut args: Vec<String> = vec![
        "prod".into(),
        "new".into(),
        "--title".into(),
        title.into(),
    ];
    for (label, grams) in parts {
        args.push("--part".into());
        args.push(format!("{}:{}", label, grams));
    }
    if let Some(price) = price {
        args.push("--price".into());
        args.push(price.to_string());
    }
    args.push("--format".into());
    args.push("id".into());

    let output = printdesk()
        .current_dir(tmp.path())
        .args(&args)
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test order, returning its full id
pub fn create_test_order(tmp: &TempDir, title: &str) -> String {
    let output = printdesk()
        .current_dir(tmp.path())
        .args(["order", "new", "--title", title, "--format", "id"])
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Read the raw YAML of an order file by id
pub fn read_order_file(tmp: &TempDir, order_id: &str) -> String {
    let path = tmp
        .path()
        .join("orders")
        .join(format!("{}.pd.yaml", order_id));
    std::fs::read_to_string(path).unwrap()
}
