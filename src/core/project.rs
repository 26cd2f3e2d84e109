//! Project discovery and initialization
//!
//! A GearGuard project is any directory holding a `.gearguard/` folder with
//! the project config and the SQLite database.

use rand::distr::{Alphanumeric, SampleString};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;

/// Name of the marker directory
pub const PROJECT_DIR: &str = ".gearguard";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not a GearGuard project (no .gearguard directory found in {0} or any parent). Run 'gearguard init' first")]
    NotFound(PathBuf),

    #[error("A GearGuard project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Find the project containing the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Find the project containing `start`, walking up through its parents
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(PROJECT_DIR).is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            current = dir.parent();
        }
        Err(ProjectError::NotFound(start.to_path_buf()))
    }

    /// Create a new project at `root`, writing a config with a fresh signing key
    pub fn init(root: &Path) -> Result<Self, ProjectError> {
        let dir = root.join(PROJECT_DIR);
        if dir.exists() {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }
        fs::create_dir_all(&dir)?;

        let project = Self {
            root: root.to_path_buf(),
        };
        fs::write(project.config_path(), default_config_yaml(&generate_secret()))?;
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.gearguard` directory
    pub fn gearguard_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.gearguard_dir().join("config.yaml")
    }

    pub fn database_path(&self, config: &Config) -> PathBuf {
        self.gearguard_dir().join(&config.database.file)
    }
}

/// Random 64-character alphanumeric key
fn generate_secret() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 64)
}

fn default_config_yaml(secret: &str) -> String {
    format!(
        r#"# GearGuard project configuration

auth:
  # Signing key for session tokens. Keep it private.
  secret: "{secret}"
  token_ttl_minutes: 30

registration:
  # When false, every self-registered account gets default_role.
  allow_role_selection: true
  default_role: EMPLOYEE

lifecycle:
  require_schedule_for_preventive: true
  enforce_team_membership: true
  capture_work_timestamps: false
  scrap_marks_equipment: false
  # Allowed stage moves. Every pair is allowed until product decides otherwise.
  # A table given here replaces the default whole; stages left out of it
  # have no outgoing moves.
  # transitions:
  #   NEW: [IN_PROGRESS, SCRAP]
  #   IN_PROGRESS: [REPAIRED, SCRAP]
  #   REPAIRED: []
  #   SCRAP: []

stats:
  critical_health_threshold: 30
  requests_per_technician: 5
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_and_discover() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        assert!(project.config_path().exists());

        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        let found = Project::discover_from(&nested).unwrap();
        assert_eq!(found.root(), tmp.path());
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        assert!(matches!(
            Project::init(tmp.path()),
            Err(ProjectError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_generated_config_parses() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let content = fs::read_to_string(project.config_path()).unwrap();
        let config = Config::from_yaml(&content).unwrap();
        assert_eq!(config.auth.secret.len(), 64);
        assert_eq!(config.database.file, "gearguard.db");
    }

    #[test]
    fn test_discover_outside_project() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound(_))
        ));
    }
}
