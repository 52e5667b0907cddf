use assert_cmd::prelude::*;
use chrono::{Datelike, Local};
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn facture_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("facture"))
}

#[test]
fn test_help() {
    facture_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CLI invoicing system"));
}

#[test]
fn test_version() {
    facture_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("facture"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized facture config"));

    // Check files were created
    assert!(config_path.join("business.toml").exists());
    assert!(config_path.join("parties.toml").exists());
    assert!(config_path.join("credentials").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    // First init should succeed
    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // Second init should fail
    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_list_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_parties_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "parties"])
        .assert()
        .success()
        .stdout(predicate::str::contains("example-party"))
        .stdout(predicate::str::contains("Example Client Inc."));
}

#[test]
fn test_business_shows_profile() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "business"])
        .assert()
        .success()
        .stdout(predicate::str::contains("YOUR BRAND NAME"))
        .stdout(predicate::str::contains("Art. 293 B"));
}

/// The YYYYMM prefix for today, as the allocator sees it
fn current_prefix() -> String {
    let today = Local::now().date_naive();
    format!("{:04}{:02}", today.year(), today.month())
}

fn write_ledger(config_path: &std::path::Path, ledger: &str) {
    fs::write(config_path.join("invoices.toml"), ledger).unwrap();
}

#[test]
fn test_next_number_on_empty_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "next-number"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{}01", current_prefix())));
}

#[test]
fn test_next_number_continues_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    let prefix = current_prefix();
    write_ledger(
        &config_path,
        &format!(
            r#"[[invoices]]
number = "{prefix}01"
date = "2024-01-10"
party = "example-party"
payment_term = "30 days"

[[invoices.line_items]]
description = "Development"
rate = 650.0
quantity = 3.0
unit = "days"

[[invoices]]
number = "{prefix}02"
date = "2024-01-11"
party = "example-party"
payment_term = "30 days"

[[invoices.line_items]]
description = "Review"
rate = 400.0
quantity = 1.0
unit = "days"
"#
        ),
    );

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "next-number"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{prefix}03")));
}

#[test]
fn test_create_unknown_party() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "--party",
            "ghost",
            "--item",
            "Development:650:3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ghost' not found"));
}

#[test]
fn test_create_requires_items() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "--party",
            "example-party",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No items specified"));
}

#[test]
fn test_create_invalid_item_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "--party",
            "example-party",
            "--item",
            "just-a-description",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid item format"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "--party",
            "example-party",
            "--item",
            "Development:650:0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));
}

#[test]
fn test_create_rejects_malformed_number() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "--party",
            "example-party",
            "--item",
            "Development:650:3",
            "--number",
            "INV-001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected 8 digits"));
}

#[test]
fn test_create_requires_business_profile() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // No business profile configured
    fs::remove_file(config_path.join("business.toml")).unwrap();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "--party",
            "example-party",
            "--item",
            "Development:650:3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Business details not configured"));

    // Nothing was persisted
    assert!(!config_path.join("invoices.toml").exists());
}

#[test]
fn test_list_shows_invoices() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_ledger(
        &config_path,
        r#"[[invoices]]
number = "20240101"
date = "2024-01-15"
party = "example-party"
payment_term = "30 days"

[[invoices.line_items]]
description = "Development"
rate = 650.0
quantity = 3.0
unit = "days"

[[invoices]]
number = "20240102"
date = "2024-01-20"
party = "example-party"
payment_term = "30 days"
drive_file_id = "file-abc"
drive_file_url = "https://drive.google.com/file/d/file-abc/view"
drive_folder_id = "folder-abc"

[[invoices.line_items]]
description = "Review"
rate = 400.0
quantity = 0.5
unit = "days"
"#,
    );

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20240101"))
        .stdout(predicate::str::contains("20240102"))
        .stdout(predicate::str::contains("1 950.00"))
        .stdout(predicate::str::contains("200.00"))
        .stdout(predicate::str::contains("Total: 2 invoices"));
}

#[test]
fn test_show_invoice_by_number() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_ledger(
        &config_path,
        r#"[[invoices]]
number = "20240101"
date = "2024-01-15"
party = "example-party"
payment_term = "45 days"

[[invoices.line_items]]
description = "Development"
rate = 650.0
quantity = 3.0
unit = "days"
group = "Sprint 12"

[[invoices.line_items]]
description = "Review"
rate = 400.0
quantity = 0.5
unit = "days"
"#,
    );

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show", "20240101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice 20240101"))
        .stdout(predicate::str::contains("Example Client Inc."))
        .stdout(predicate::str::contains("45 days"))
        .stdout(predicate::str::contains("[Sprint 12]"))
        .stdout(predicate::str::contains("2 150.00"));
}

#[test]
fn test_delete_by_number() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // No Drive ids, so deletion is purely local
    write_ledger(
        &config_path,
        r#"[[invoices]]
number = "20240101"
date = "2024-01-15"
party = "example-party"
payment_term = "30 days"

[[invoices.line_items]]
description = "Development"
rate = 650.0
quantity = 3.0
unit = "days"
"#,
    );

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "delete", "20240101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 20240101"));

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoices yet."));
}

#[test]
fn test_delete_nonexistent_invoice() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "delete", "20249999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_attach_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_ledger(
        &config_path,
        r#"[[invoices]]
number = "20240101"
date = "2024-01-15"
party = "example-party"
payment_term = "30 days"

[[invoices.line_items]]
description = "Development"
rate = 650.0
quantity = 3.0
unit = "days"
"#,
    );

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "attach",
            "20240101",
            "/nonexistent/timesheet.pdf",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Attachment file not found"));
}
