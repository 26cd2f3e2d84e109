//! Request workflow tests through the command line

mod common;

use common::{setup_test_project, TestProject};
use predicates::prelude::*;
use serde_json::Value;

/// Project with an admin, a manager, two technicians and an employee
struct Shop {
    project: TestProject,
    admin: String,
    manager: String,
    tom_id: i64,
    tom: String,
    tia_id: i64,
    tia: String,
    employee: String,
}

fn shop() -> Shop {
    let project = setup_test_project();
    let (_, admin) = project.account("ada", "admin");
    let (_, manager) = project.account("mona", "manager");
    let (tom_id, tom) = project.account("tom", "technician");
    let (tia_id, tia) = project.account("tia", "technician");
    let (_, employee) = project.account("emma", "employee");
    Shop {
        project,
        admin,
        manager,
        tom_id,
        tom,
        tia_id,
        tia,
        employee,
    }
}

impl Shop {
    fn press(&self, serial: &str, technician: Option<i64>) -> i64 {
        let tech = technician.map(|t| t.to_string());
        let mut args = vec![
            "equip", "new", "--name", "Hydraulic press", "--serial", serial, "--department",
            "Stamping",
        ];
        if let Some(ref tech) = tech {
            args.extend(["--technician", tech.as_str()]);
        }
        self.project.create(&self.manager, &args)
    }

    fn request(&self, token: &str, title: &str, equipment: i64, extra: &[&str]) -> i64 {
        let equipment = equipment.to_string();
        let mut args = vec!["req", "new", "--title", title, "--equipment", equipment.as_str()];
        args.extend_from_slice(extra);
        self.project.create(token, &args)
    }

    fn json(&self, token: &str, args: &[&str]) -> Value {
        let output = self
            .project
            .as_user(token)
            .args(args)
            .args(["-f", "json"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn test_request_inherits_equipment_technician() {
    let shop = shop();
    let press = shop.press("SN-7", Some(shop.tom_id));
    let id = shop.request(&shop.manager, "Belt stuck", press, &["--priority", "high"]);

    let request = shop.json(&shop.manager, &["req", "show", &id.to_string()]);
    assert_eq!(request["technician"], shop.tom_id);
    assert_eq!(request["stage"], "NEW");
    assert_eq!(request["priority"], "HIGH");
    assert_eq!(request["target"]["equipment"], press);
}

#[test]
fn test_explicit_technician_overrides_default() {
    let shop = shop();
    let press = shop.press("SN-7", Some(shop.tom_id));
    let tia = shop.tia_id.to_string();
    let id = shop.request(&shop.manager, "Oil leak", press, &["--technician", &tia]);

    let request = shop.json(&shop.manager, &["req", "show", &id.to_string()]);
    assert_eq!(request["technician"], shop.tia_id);
}

#[test]
fn test_both_targets_rejected() {
    let shop = shop();
    let press = shop.press("SN-7", None);
    shop.project
        .as_user(&shop.manager)
        .args([
            "req", "new", "--title", "Both", "--equipment", &press.to_string(), "--work-center",
            "1",
        ])
        .assert()
        .failure();

    shop.project
        .as_user(&shop.manager)
        .args(["req", "new", "--title", "Neither"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one of equipment or work center"));
}

#[test]
fn test_technician_list_ignores_foreign_filter() {
    let shop = shop();
    let press = shop.press("SN-7", None);
    let tom = shop.tom_id.to_string();
    let tia = shop.tia_id.to_string();
    shop.request(&shop.manager, "Mine", press, &["--technician", &tom]);
    shop.request(&shop.manager, "Hers", press, &["--technician", &tia]);

    let listed = shop.json(&shop.tom, &["req", "list", "--technician", &tia]);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Mine");
    assert_eq!(listed[0]["technician"], shop.tom_id);
}

#[test]
fn test_employee_sees_only_reported_requests() {
    let shop = shop();
    let press = shop.press("SN-7", None);
    shop.request(&shop.manager, "Manager's", press, &[]);

    let listed = shop.json(&shop.employee, &["req", "list"]);
    assert_eq!(listed.as_array().unwrap().len(), 0);

    shop.project
        .as_user(&shop.employee)
        .args(["req", "new", "--title", "Mine", "--equipment", &press.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed"));
}

#[test]
fn test_stage_moves_and_show() {
    let shop = shop();
    let press = shop.press("SN-7", Some(shop.tom_id));
    let id = shop.request(&shop.manager, "Grinding noise", press, &[]).to_string();

    shop.project
        .as_user(&shop.tom)
        .args(["req", "stage", &id, "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IN_PROGRESS"));

    // The permissive table allows jumping straight back
    shop.project
        .as_user(&shop.tom)
        .args(["req", "stage", &id, "new"])
        .assert()
        .success();

    shop.project
        .as_user(&shop.tia)
        .args(["req", "stage", &id, "repaired"])
        .assert()
        .failure();

    shop.project
        .as_user(&shop.manager)
        .args(["req", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grinding noise"))
        .stdout(predicate::str::contains("Next stages"));
}

#[test]
fn test_preventive_needs_schedule() {
    let shop = shop();
    let press = shop.press("SN-7", None);
    shop.project
        .as_user(&shop.manager)
        .args([
            "req", "new", "--title", "Lubricate", "--equipment", &press.to_string(), "--type",
            "preventive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scheduled date"));

    shop.request(
        &shop.manager,
        "Lubricate",
        press,
        &["--type", "preventive", "--scheduled", "2024-06-12"],
    );
}

#[test]
fn test_edit_and_clear_technician() {
    let shop = shop();
    let press = shop.press("SN-7", Some(shop.tom_id));
    let id = shop.request(&shop.manager, "Leak", press, &[]).to_string();

    shop.project
        .as_user(&shop.manager)
        .args(["req", "edit", &id, "--clear-technician", "--priority", "critical"])
        .assert()
        .success();
    let request = shop.json(&shop.manager, &["req", "show", &id]);
    assert!(request.get("technician").is_none());
    assert_eq!(request["priority"], "CRITICAL");

    shop.project
        .as_user(&shop.manager)
        .args(["req", "edit", &id, "--reassign"])
        .assert()
        .success();
    let request = shop.json(&shop.manager, &["req", "show", &id]);
    assert_eq!(request["technician"], shop.tom_id);
}

#[test]
fn test_calendar_range() {
    let shop = shop();
    let press = shop.press("SN-7", None);
    for (title, day) in [
        ("Before", "2024-05-31"),
        ("First", "2024-06-01"),
        ("Last", "2024-06-30"),
        ("After", "2024-07-01"),
    ] {
        shop.request(
            &shop.manager,
            title,
            press,
            &["--type", "preventive", "--scheduled", day],
        );
    }

    let events = shop.json(
        &shop.manager,
        &["req", "calendar", "--from", "2024-06-01", "--to", "2024-06-30"],
    );
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Last"]);

    shop.project
        .as_user(&shop.manager)
        .args(["req", "calendar", "--from", "2024-06-30", "--to", "2024-06-01"])
        .assert()
        .failure();
}

#[test]
fn test_stats_views() {
    let shop = shop();
    let press = shop.press("SN-7", Some(shop.tom_id));
    let done = shop.request(&shop.manager, "Done", press, &[]).to_string();
    shop.request(&shop.manager, "Open", press, &[]);
    shop.project
        .as_user(&shop.tom)
        .args(["req", "stage", &done, "repaired"])
        .assert()
        .success();

    let global = shop.json(&shop.admin, &["stats"]);
    assert_eq!(global["view"], "global");
    assert_eq!(global["open_requests"]["count"], 1);
    assert_eq!(global["open_requests"]["label"], "Pending Requests");
    assert_eq!(global["technician_load"]["technicians"], 2);

    let mine = shop.json(&shop.tom, &["stats"]);
    assert_eq!(mine["view"], "technician");
    assert_eq!(mine["assigned"], 2);
    assert_eq!(mine["completed"], 1);

    shop.project
        .as_user(&shop.employee)
        .arg("stats")
        .assert()
        .failure();
}

#[test]
fn test_list_csv_output() {
    let shop = shop();
    let press = shop.press("SN-7", None);
    shop.request(&shop.manager, "Squeak", press, &[]);

    shop.project
        .as_user(&shop.manager)
        .args(["req", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,title,target"))
        .stdout(predicate::str::contains("Squeak"));
}

#[test]
fn test_equipment_with_requests_cannot_be_deleted() {
    let shop = shop();
    let press = shop.press("SN-7", None).to_string();
    let id = shop
        .request(&shop.manager, "Squeak", press.parse().unwrap(), &[])
        .to_string();

    shop.project
        .as_user(&shop.manager)
        .args(["equip", "delete", &press])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still has 1 request"));

    shop.project
        .as_user(&shop.manager)
        .args(["req", "delete", &id])
        .assert()
        .success();
    shop.project
        .as_user(&shop.manager)
        .args(["equip", "delete", &press])
        .assert()
        .success();
}

#[test]
fn test_team_delete_clears_references() {
    let shop = shop();
    let team = shop
        .project
        .create(&shop.manager, &["team", "new", "--name", "Mechanics"]);
    let team = team.to_string();
    shop.project
        .as_user(&shop.manager)
        .args(["team", "add-member", &team, &shop.tom_id.to_string()])
        .assert()
        .success();

    let members = shop.json(&shop.manager, &["team", "members", &team]);
    assert_eq!(members.as_array().unwrap().len(), 1);

    shop.project
        .as_user(&shop.manager)
        .args(["team", "delete", &team])
        .assert()
        .failure();
    shop.project
        .as_user(&shop.admin)
        .args(["team", "delete", &team])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 member(s)"));

    let tom = shop.json(&shop.admin, &["user", "show", &shop.tom_id.to_string()]);
    assert!(tom.get("team").is_none());
}
