use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const BIN_NAME: &str = "spendwise";
const PASSWORD: &str = "correct horse battery";

fn spendwise(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("SPENDWISE_DATA_DIR", data_dir.path())
        .env("SPENDWISE_PASSWORD", PASSWORD)
        .env_remove("SPENDWISE_USER")
        .env_remove("SPENDWISE_LOG");
    cmd
}

/// Data dir with user alice, expense category Food and a July 2025 budget of 500
fn setup_alice() -> TempDir {
    let data_dir = TempDir::new().unwrap();
    spendwise(&data_dir).arg("init").assert().success();
    spendwise(&data_dir)
        .args(["user", "register", "alice"])
        .assert()
        .success();
    spendwise(&data_dir)
        .args(["--user", "alice", "category", "add", "Food"])
        .assert()
        .success();
    spendwise(&data_dir)
        .args(["--user", "alice", "budget", "set", "Food", "500", "--month", "2025-07"])
        .assert()
        .success()
        .stdout(contains("Set budget for Food in July 2025"));
    data_dir
}

#[test]
fn cli_init_creates_collections() {
    let data_dir = TempDir::new().unwrap();
    spendwise(&data_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialization complete"));

    assert!(data_dir.path().join("config.json").exists());
    assert!(data_dir.path().join("data").join("budgets.json").exists());
}

#[test]
fn cli_refuses_expense_over_budget() {
    let data_dir = setup_alice();

    spendwise(&data_dir)
        .args(["-u", "alice", "transaction", "add", "expense", "Food", "200", "--date", "2025-07-03"])
        .assert()
        .success()
        .stdout(contains("Added expense of ₱200.00 to Food"));

    spendwise(&data_dir)
        .args(["-u", "alice", "txn", "add", "expense", "Food", "400", "--date", "2025-07-04"])
        .assert()
        .failure()
        .stderr(contains("Insufficient budget in 'Food'"));

    spendwise(&data_dir)
        .args(["-u", "alice", "budget", "show", "Food", "--month", "2025-07"])
        .assert()
        .success()
        .stdout(contains("Consumed:  ₱200.00").and(contains("Remaining: ₱300.00")));
}

#[test]
fn cli_json_report() {
    let data_dir = setup_alice();
    spendwise(&data_dir)
        .args(["-u", "alice", "transaction", "add", "expense", "Food", "42.50", "-d", "2025-07-10"])
        .assert()
        .success();

    spendwise(&data_dir)
        .args(["-u", "alice", "--json", "report", "budget", "--month", "2025-07"])
        .assert()
        .success()
        .stdout(contains("\"data\"").and(contains("\"total_consumed\": 4250")));
}

#[test]
fn cli_wrong_password_is_unauthorized() {
    let data_dir = setup_alice();

    spendwise(&data_dir)
        .env("SPENDWISE_PASSWORD", "not the password")
        .args(["-u", "alice", "--json", "category", "list"])
        .assert()
        .failure()
        .stdout(contains("\"error\": \"Invalid username or password\""));

    spendwise(&data_dir)
        .env("SPENDWISE_PASSWORD", "not the password")
        .args(["user", "verify", "ALICE"])
        .assert()
        .failure()
        .stderr(contains("Invalid username or password"));
}

#[test]
fn cli_data_commands_need_a_user() {
    let data_dir = setup_alice();
    spendwise(&data_dir)
        .args(["category", "list"])
        .assert()
        .failure()
        .stderr(contains("--user"));
}

#[test]
fn cli_duplicate_username_ignores_case() {
    let data_dir = setup_alice();
    spendwise(&data_dir)
        .args(["user", "register", "Alice"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn cli_config_sets_currency() {
    let data_dir = setup_alice();
    spendwise(&data_dir)
        .args(["config", "currency_symbol", "$"])
        .assert()
        .success()
        .stdout(contains("currency_symbol:   $"));

    spendwise(&data_dir)
        .args(["-u", "alice", "budget", "list"])
        .assert()
        .success()
        .stdout(contains("$500.00"));
}
