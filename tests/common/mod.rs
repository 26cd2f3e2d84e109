//! Shared test helpers for integration tests
//!
//! Every command runs inside a throwaway project with the user config
//! directory pointed into the same temp dir, so nothing on the host leaks in.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

pub const PASSWORD: &str = "correct-horse";

/// A gearguard command isolated from the host environment
pub fn gearguard() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("gearguard"));
    cmd.env_remove("GEARGUARD_TOKEN")
        .env_remove("GEARGUARD_SECRET")
        .env_remove("GEARGUARD_LOG");
    cmd
}

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    /// Command running inside the project
    pub fn cmd(&self) -> Command {
        let mut cmd = gearguard();
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"));
        cmd
    }

    /// Command running inside the project with a session token
    pub fn as_user(&self, token: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.env("GEARGUARD_TOKEN", token);
        cmd
    }

    /// Register an account and return its id
    pub fn register(&self, username: &str, role: &str) -> i64 {
        let email = format!("{}@plant.test", username);
        let output = self
            .cmd()
            .args([
                "register", username, "--email", &email, "--password", PASSWORD, "--role", role,
                "-f", "id",
            ])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "register failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        parse_id(&output.stdout)
    }

    /// Log in and return the token
    pub fn login(&self, username: &str) -> String {
        let output = self
            .cmd()
            .args(["login", username, "--password", PASSWORD, "-f", "id"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "login failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Register and log in; returns (id, token)
    pub fn account(&self, username: &str, role: &str) -> (i64, String) {
        let id = self.register(username, role);
        (id, self.login(username))
    }

    /// Run a creating command with `-f id` and return the new record id
    pub fn create(&self, token: &str, args: &[&str]) -> i64 {
        let output = self
            .as_user(token)
            .args(args)
            .args(["-f", "id"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        parse_id(&output.stdout)
    }
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TestProject {
    let project = TestProject {
        dir: TempDir::new().unwrap(),
    };
    project.cmd().arg("init").assert().success();
    project
}

fn parse_id(stdout: &[u8]) -> i64 {
    String::from_utf8_lossy(stdout)
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("expected an id, got {:?}", String::from_utf8_lossy(stdout)))
}
