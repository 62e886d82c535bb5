use assert_cmd::Command;
use predicates::prelude::*;

fn eventdates() -> Command {
    Command::cargo_bin("eventdates").unwrap()
}

fn anchored(start: &str, end: &str) -> Command {
    let mut cmd = eventdates();
    cmd.args(["--start", start, "--end", end]);
    cmd
}

// ============================================================
// Generating dates
// ============================================================

#[test]
fn test_one_off() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--tz", "Pacific/Auckland"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2021-05-15T01:30:00Z"))
        .stdout(predicate::str::contains("2021-05-22").not());
}

#[test]
fn test_weekly_defaults_to_ten_dates() {
    let out = anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 10);
    assert!(text.starts_with("2021-05-15T13:30:00"));
}

#[test]
fn test_n_caps_output() {
    let out = anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly", "-n", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
}

#[test]
fn test_monthly_by_weekday() {
    anchored("2021-05-13T19:00", "2021-05-13T23:00")
        .args(["--every", "monthly", "--week-of-month", "2", "--weekday", "thursday"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2021-06-10T19:00:00"));
}

#[test]
fn test_monthly_day_31_skips_short_months() {
    anchored("2021-01-31T20:00", "2021-01-31T22:00")
        .args(["--every", "monthly", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2021-03-31T20:00:00"))
        .stdout(predicate::str::contains("2021-02-").not());
}

#[test]
fn test_rule_json() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args([
            "--rule",
            r#"{"recurringType":1,"separationCount":2,"dayOfWeek":5}"#,
            "-n",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2021-05-29T13:30:00"));
}

#[test]
fn test_json_output() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly", "-n", "1", "--json", "--tz", "Europe/London"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"start_utc\""))
        .stdout(predicate::str::contains("\"tz\": \"Europe/London\""));
}

#[test]
fn test_no_upcoming_dates() {
    anchored("2021-02-01T10:00", "2021-02-01T11:00")
        .args(["--every", "yearly", "--month", "feb", "--day", "30"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no upcoming dates"));
}

// ============================================================
// --describe and --check
// ============================================================

#[test]
fn test_describe() {
    anchored("2021-03-26T18:00", "2021-03-26T20:00")
        .args(["--every", "yearly", "--week-of-month", "last", "--describe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last friday of march every year"));
}

#[test]
fn test_describe_one_off() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .arg("--describe")
        .assert()
        .success()
        .stdout(predicate::str::contains("once"));
}

#[test]
fn test_check_valid() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_check_unknown_timezone() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--tz", "Mars/Olympus_Mons", "--check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown timezone"));
}

// ============================================================
// Errors
// ============================================================

#[test]
fn test_end_before_start() {
    anchored("2021-05-15T15:30", "2021-05-15T13:30")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_bad_datetime() {
    anchored("yesterday", "2021-05-15T13:30")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid --start datetime"));
}

#[test]
fn test_zero_interval() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly", "--interval", "0"])
        .assert()
        .code(1);
}

#[test]
fn test_bad_rule_json() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--rule", "{oops"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed rule JSON"));
}

#[test]
fn test_missing_start_is_usage_error() {
    eventdates()
        .args(["--end", "2021-05-15T15:30"])
        .assert()
        .code(2);
}

#[test]
fn test_rule_conflicts_with_every() {
    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly", "--rule", "{}"])
        .assert()
        .code(2);
}

// ============================================================
// --config
// ============================================================

#[test]
fn test_config_file() {
    let dir = std::env::temp_dir().join(format!("eventdates-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("series.toml");
    std::fs::write(&path, "max_live_dates = 4\n").unwrap();

    let out = anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .args(["--every", "weekly", "--config"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 4);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_bad_config_file() {
    let dir = std::env::temp_dir().join(format!("eventdates-cli-bad-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("series.toml");
    std::fs::write(&path, "weekly_horizon_years = 0\n").unwrap();

    anchored("2021-05-15T13:30", "2021-05-15T15:30")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration"));
    std::fs::remove_dir_all(&dir).unwrap();
}
