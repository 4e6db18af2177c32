use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn door_orders_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("door-orders"))
}

fn init_config(config_path: &Path) {
    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

/// Runs a command against `config_path` and expects it to succeed.
fn run_ok(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(args)
        .assert()
        .success()
}

/// An initialized config with one order holding one 80x200 door.
fn order_with_door() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    run_ok(&config_path, &["new", "--customer", "Acme Builders"]);
    run_ok(
        &config_path,
        &["door", "add", "1", "--width", "80", "--height", "200", "-m", "7:Classic oak"],
    );
    (temp_dir, config_path)
}

#[test]
fn test_help() {
    door_orders_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Order desk for door manufacturing"));
}

#[test]
fn test_version() {
    door_orders_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("door-orders"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized door-orders config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("casing_ranges.toml").exists());
    assert!(config_path.join("orders").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    run_ok(&config_path, &["status"])
        .stdout(predicate::str::contains("Your Door Company"))
        .stdout(predicate::str::contains("Casing ranges:    2"))
        .stdout(predicate::str::contains("-0001"));
}

#[test]
fn test_new_order_advances_counter() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    run_ok(&config_path, &["new", "--customer", "First"])
        .stdout(predicate::str::contains("-0001"));
    run_ok(&config_path, &["new", "--customer", "Second", "--deadline", "2030-01-15"])
        .stdout(predicate::str::contains("-0002"));

    run_ok(&config_path, &["list"])
        .stdout(predicate::str::contains("First"))
        .stdout(predicate::str::contains("Second"))
        .stdout(predicate::str::contains("DRAFT"));

    run_ok(&config_path, &["status"]).stdout(predicate::str::contains("-0003"));
}

#[test]
fn test_new_rejects_bad_deadline() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["new", "--customer", "Acme", "--deadline", "15/01/2030"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_list_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    run_ok(&config_path, &["list"]).stdout(predicate::str::contains("No orders yet."));
}

#[test]
fn test_casings_and_crown_follow_the_door() {
    let (_temp_dir, config_path) = order_with_door();

    run_ok(&config_path, &["casing", "add", "1", "1", "--type", "side"])
        .stdout(predicate::str::contains("height 206, width 6"));
    run_ok(&config_path, &["casing", "add", "1", "1", "--type", "прямой"])
        .stdout(predicate::str::contains("height 92, width 6"));
    run_ok(&config_path, &["crown", "add", "1", "1"])
        .stdout(predicate::str::contains("width 90"));

    run_ok(&config_path, &["show", "1"])
        .stdout(predicate::str::contains("Acme Builders"))
        .stdout(predicate::str::contains("Classic oak"))
        .stdout(predicate::str::contains("80 x 200"))
        .stdout(predicate::str::contains("6 x 206"))
        .stdout(predicate::str::contains("6 x 92"))
        .stdout(predicate::str::contains("90 x 0"));
}

#[test]
fn test_resize_rederives_casings() {
    let (_temp_dir, config_path) = order_with_door();
    run_ok(&config_path, &["casing", "add", "1", "1", "--type", "side"]);
    run_ok(&config_path, &["crown", "add", "1", "1"]);

    run_ok(&config_path, &["door", "resize", "1", "1", "--width", "90", "-H", "210"])
        .stdout(predicate::str::contains("90 x 210"));

    run_ok(&config_path, &["show", "1"])
        .stdout(predicate::str::contains("6 x 216"))
        .stdout(predicate::str::contains("100 x 0"));
}

#[test]
fn test_formula2_takes_height_from_range() {
    let (_temp_dir, config_path) = order_with_door();

    // Door height 200 falls in the 180-220 range of the template.
    run_ok(
        &config_path,
        &["casing", "add", "1", "1", "--type", "side", "--formula", "formula2", "--range", "auto"],
    )
    .stdout(predicate::str::contains("height 215"));

    run_ok(&config_path, &["casing", "formula", "1", "1", "1", "formula1"])
        .stdout(predicate::str::contains("formula1: height 206"));

    run_ok(
        &config_path,
        &["casing", "formula", "1", "1", "1", "formula2", "--range", "1"],
    )
    .stdout(predicate::str::contains("formula2: height 58"));
}

#[test]
fn test_unknown_range_is_rejected() {
    let (_temp_dir, config_path) = order_with_door();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["casing", "add", "1", "1", "--type", "side", "--formula", "2", "--range", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Casing range 99 not found"));
}

#[test]
fn test_unknown_door_index() {
    let (_temp_dir, config_path) = order_with_door();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["casing", "add", "1", "3", "--type", "side"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Door #3 not found"));
}

#[test]
fn test_unknown_casing_index() {
    let (_temp_dir, config_path) = order_with_door();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["casing", "formula", "1", "1", "2", "formula1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Casing #2 not found on door #1"));
}

#[test]
fn test_invalid_order_index() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["show", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid order index '5'"));
}

#[test]
fn test_remove_door() {
    let (_temp_dir, config_path) = order_with_door();

    run_ok(&config_path, &["door", "remove", "1", "1"])
        .stdout(predicate::str::contains("Removed door #1"));
    run_ok(&config_path, &["show", "1"]).stdout(predicate::str::contains("No doors yet."));
}

#[test]
fn test_discount_agreement_is_kept() {
    let (_temp_dir, config_path) = order_with_door();

    run_ok(&config_path, &["discount", "1", "--percent", "10"])
        .stdout(predicate::str::contains("10.00%"));
    run_ok(&config_path, &["discount", "1", "--agreement", "5 000,50"]);

    run_ok(&config_path, &["show", "1"])
        .stdout(predicate::str::contains("Not priced yet"))
        .stdout(predicate::str::contains("Agreement:         5,000.50 UZS"))
        .stdout(predicate::str::contains("Discount:          10.00%"));
}

#[test]
fn test_discount_amount_below_agreement_warns() {
    let (_temp_dir, config_path) = order_with_door();

    run_ok(&config_path, &["discount", "1", "--agreement", "1000"])
        .stderr(predicate::str::contains("Warning").not());

    run_ok(&config_path, &["discount", "1", "--amount", "400"])
        .stdout(predicate::str::contains("Discount: 0.00% = 400.00 UZS, agreement 1,000.00 UZS"))
        .stderr(predicate::str::contains(
            "discount amount 400.00 UZS is below the agreement 1,000.00 UZS",
        ))
        .stderr(predicate::str::contains("submitted with 1,000.00 UZS"));
}

#[test]
fn test_discount_requires_exactly_one_field() {
    let (_temp_dir, config_path) = order_with_door();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["discount", "1", "--percent", "5", "--amount", "100"])
        .assert()
        .failure();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["discount", "1"])
        .assert()
        .failure();
}

#[test]
fn test_viewer_cannot_edit() {
    let (_temp_dir, config_path) = order_with_door();
    let config_file = config_path.join("config.toml");
    let config = fs::read_to_string(&config_file).unwrap();
    fs::write(
        &config_file,
        config.replace("role = \"manager\"", "role = \"viewer\""),
    )
    .unwrap();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["door", "add", "1", "--width", "80", "--height", "200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["discount", "1", "--percent", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));

    // Reading is still allowed.
    run_ok(&config_path, &["show", "1"]).stdout(predicate::str::contains("Acme Builders"));
}

#[test]
fn test_submit_empty_order_fails_before_network() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);
    run_ok(&config_path, &["new", "--customer", "Acme"]);

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["submit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no doors"));
}

#[test]
fn test_submit_without_price_requires_calculation() {
    let (_temp_dir, config_path) = order_with_door();

    door_orders_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["submit", "1", "--no-recalculate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no price yet"));
}

#[test]
fn test_ranges_list_shows_cache() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("door-config");
    init_config(&config_path);

    run_ok(&config_path, &["ranges", "list"])
        .stdout(predicate::str::contains("CASING HEIGHT"))
        .stdout(predicate::str::contains("215"));
}
