//! Layered configuration
//!
//! Built-in defaults, then the user config under the platform config
//! directory, then the project's `.gearguard/config.yaml`, then environment
//! overrides. Later layers replace individual keys, not whole sections,
//! except for tables listed in [`REPLACED_TABLES`], which a layer replaces
//! whole.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::lifecycle::StageTable;
use crate::core::project::Project;
use crate::entities::user::Role;

/// Environment variable overriding `auth.secret`
pub const SECRET_ENV: &str = "GEARGUARD_SECRET";

/// `(section, key)` tables a layer replaces instead of merging into
///
/// A stage missing from `lifecycle.transitions` has no outgoing moves, so
/// the permissive default must not show through underneath it.
pub const REPLACED_TABLES: &[(&str, &str)] = &[("lifecycle", "transitions")];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub registration: RegistrationPolicy,
    pub lifecycle: LifecycleConfig,
    pub stats: StatsConfig,
    pub database: DatabaseConfig,
}

/// Credential signing settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing key for session tokens
    pub secret: String,

    /// Token lifetime in minutes
    pub token_ttl_minutes: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_minutes: 30,
        }
    }
}

/// What a self-registering caller may choose
///
/// Open role selection lets anyone register as ADMIN. It stays on by default
/// until product decides otherwise; switching it off pins every new account
/// to `default_role`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationPolicy {
    pub allow_role_selection: bool,
    pub default_role: Role,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            allow_role_selection: true,
            default_role: Role::Employee,
        }
    }
}

impl RegistrationPolicy {
    /// Role a new account actually receives
    pub fn effective_role(&self, requested: Option<Role>) -> Role {
        match requested {
            Some(role) if self.allow_role_selection => role,
            _ => self.default_role,
        }
    }
}

/// Request lifecycle rules
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Allowed stage moves; the default permits every pair
    pub transitions: StageTable,

    /// PREVENTIVE requests must carry a scheduled date
    pub require_schedule_for_preventive: bool,

    /// A technician assigned on update must belong to the request's team
    pub enforce_team_membership: bool,

    /// Stamp started_at / completed_at / duration_minutes on stage moves
    pub capture_work_timestamps: bool,

    /// Moving a request to SCRAP marks its equipment SCRAP
    pub scrap_marks_equipment: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            transitions: StageTable::permissive(),
            require_schedule_for_preventive: true,
            enforce_team_membership: true,
            capture_work_timestamps: false,
            scrap_marks_equipment: false,
        }
    }
}

/// Dashboard thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Equipment scoring below this health percentage counts as critical
    pub critical_health_threshold: f64,

    /// Open requests one technician carries at full load
    pub requests_per_technician: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            critical_health_threshold: 30.0,
            requests_per_technician: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, relative to the project's `.gearguard` directory
    pub file: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file: "gearguard.db".to_string(),
        }
    }
}

impl Config {
    /// Load every layer that applies to the given project
    pub fn load(project: Option<&Project>) -> Result<Self, ConfigError> {
        let mut merged = serde_yml::to_value(Config::default())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                apply_layer(&mut merged, read_layer(&path)?);
            }
        }

        if let Some(project) = project {
            let path = project.config_path();
            if path.exists() {
                apply_layer(&mut merged, read_layer(&path)?);
            }
        }

        let mut config: Config =
            serde_yml::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Ok(secret) = std::env::var(SECRET_ENV) {
            if !secret.is_empty() {
                config.auth.secret = secret;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a single YAML document on top of the defaults
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut merged = serde_yml::to_value(Config::default())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let overlay: serde_yml::Value =
            serde_yml::from_str(content).map_err(|e| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?;
        apply_layer(&mut merged, overlay);
        let config: Config =
            serde_yml::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Location of the per-user config file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gearguard")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.stats.requests_per_technician == 0 {
            return Err(ConfigError::Invalid(
                "stats.requests_per_technician must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.stats.critical_health_threshold) {
            return Err(ConfigError::Invalid(
                "stats.critical_health_threshold must be between 0 and 100".to_string(),
            ));
        }
        if self.auth.token_ttl_minutes == 0 {
            return Err(ConfigError::Invalid(
                "auth.token_ttl_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_layer(path: &Path) -> Result<serde_yml::Value, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(serde_yml::Value::Null);
    }
    serde_yml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Overlay one config layer onto the merged result so far
fn apply_layer(base: &mut serde_yml::Value, overlay: serde_yml::Value) {
    for (section, key) in REPLACED_TABLES {
        let replaced = overlay
            .get(*section)
            .and_then(|s| s.get(*key))
            .is_some_and(|v| !v.is_null());
        if !replaced {
            continue;
        }
        if let Some(table) = base.get_mut(*section).and_then(|s| s.get_mut(*key)) {
            *table = serde_yml::Value::Null;
        }
    }
    merge_values(base, overlay);
}

/// Recursively overlay `overlay` onto `base`; mappings merge key by key,
/// everything else is replaced
fn merge_values(base: &mut serde_yml::Value, overlay: serde_yml::Value) {
    match (base, overlay) {
        (_, serde_yml::Value::Null) => {}
        (serde_yml::Value::Mapping(base_map), serde_yml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
