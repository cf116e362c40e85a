#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RULES: &str = r#"{
  "organization": {
    "areas": [{ "id": "a1", "name": "Atelier", "manning": 30 }],
    "groups": [{ "id": "g1", "name": "Equipe A", "area": "a1" }]
  },
  "tiers": [
    { "id": "1-4", "from_years": 1, "to_years": 4, "auto_assign_days": 3, "total_days": 22 },
    { "id": "5+", "from_years": 5, "auto_assign_days": 5, "total_days": 25 }
  ],
  "rotations": [{
    "rule": "r1",
    "pattern": "A",
    "entries": [
      { "index": 0, "weekday": "Mon", "shift": "Morning" },
      { "index": 1, "weekday": "Tue", "shift": "Morning" },
      { "index": 2, "weekday": "Wed", "shift": "Afternoon" },
      { "index": 3, "weekday": "Thu", "shift": "Afternoon" },
      { "index": 4, "weekday": "Fri", "shift": "Night" },
      { "index": 5, "weekday": "Sat", "shift": "Rest" },
      { "index": 6, "weekday": "Sun", "shift": "Rest" }
    ]
  }]
}"#;

const EMPLOYEES: &str = "id,payroll,group,hire_date,rule,pattern,anchor_date,anchor_index\n\
e1,101,g1,2015-04-01,r1,A,2024-12-30,0\n";

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("conges-cli").unwrap();
    cmd.arg("--data").arg(data);
    cmd
}

#[test]
fn full_annual_run() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("conges.json");
    let rules = dir.path().join("rules.json");
    let employees = dir.path().join("employees.csv");
    let vacations = dir.path().join("vacations.csv");
    fs::write(&rules, RULES).unwrap();
    fs::write(&employees, EMPLOYEES).unwrap();

    cli(&data)
        .args(["init", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset created for 2025"));

    cli(&data)
        .arg("import-rules")
        .arg("--json")
        .arg(&rules)
        .assert()
        .success();

    cli(&data)
        .arg("import-employees")
        .arg("--csv")
        .arg(&employees)
        .assert()
        .success();

    cli(&data)
        .arg("tenure")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 employee(s), 0 without tier"));

    cli(&data)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("365 day(s) created"));

    cli(&data)
        .arg("assign")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "group g1: 1/1 employees fulfilled, 5 day(s) assigned, completed",
        ));

    cli(&data)
        .args(["absence", "--group", "g1", "--date", "2025-01-08"])
        .assert()
        .success()
        .stdout(predicate::str::contains("absence 3.33%"));

    cli(&data)
        .args(["list", "--payroll", "101", "--out-vacations"])
        .arg(&vacations)
        .assert()
        .success()
        .stdout(predicate::str::contains("vacation:auto-e1-20250108"));
    let exported = fs::read_to_string(&vacations).unwrap();
    assert!(exported.starts_with("id,employee,date,shift,group,area,origin"));
    assert_eq!(exported.lines().count(), 6);

    cli(&data)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no violations"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("conges.json");

    cli(&data).args(["init", "--year", "2025"]).assert().success();
    cli(&data)
        .args(["init", "--year", "2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    cli(&data)
        .args(["init", "--year", "2025", "--force"])
        .assert()
        .success();
}

#[test]
fn commands_need_a_dataset() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("missing.json");

    cli(&data)
        .arg("assign")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `init` first"));
}

#[test]
fn duplicate_payroll_is_rejected() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("conges.json");
    let employees = dir.path().join("employees.csv");
    fs::write(&employees, EMPLOYEES).unwrap();

    cli(&data).args(["init", "--year", "2025"]).assert().success();
    cli(&data)
        .arg("import-employees")
        .arg("--csv")
        .arg(&employees)
        .assert()
        .success();
    cli(&data)
        .arg("import-employees")
        .arg("--csv")
        .arg(&employees)
        .assert()
        .failure()
        .stderr(predicate::str::contains("payroll 101 already imported"));
}

#[test]
fn leave_for_unknown_employee_is_rejected() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("conges.json");
    let employees = dir.path().join("employees.csv");
    let leaves = dir.path().join("leaves.csv");
    fs::write(&employees, EMPLOYEES).unwrap();
    fs::write(
        &leaves,
        "id,employee,start,end,kind\n\
         l1,e1,2025-02-03,2025-02-04,leave\n\
         l2,zz,2025-02-03,2025-02-04,leave\n",
    )
    .unwrap();

    cli(&data).args(["init", "--year", "2025"]).assert().success();
    cli(&data)
        .arg("import-employees")
        .arg("--csv")
        .arg(&employees)
        .assert()
        .success();
    cli(&data)
        .arg("import-leaves")
        .arg("--csv")
        .arg(&leaves)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown employee: zz"));
}
