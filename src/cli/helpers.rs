//! Shared helper functions for CLI commands
//!
//! Opening the project, turning the token into a session, and the small
//! parsing and formatting helpers the command modules share.

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{theme::ColorfulTheme, Password};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::calendar::CalendarProjector;
use crate::core::catalog::Catalog;
use crate::core::config::Config;
use crate::core::directory::SqliteDirectory;
use crate::core::entity::RecordId;
use crate::core::error::ServiceError;
use crate::core::lifecycle::RequestManager;
use crate::core::project::Project;
use crate::core::session::{AuthService, Session};
use crate::core::stats::StatsAggregator;

/// Everything a command needs once the project is open
pub struct AppContext {
    pub project: Project,
    pub config: Config,
    pub directory: SqliteDirectory,
}

impl AppContext {
    /// Discover the project, load config layers and open the database
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = Project::discover_from(&start_dir(global)?)
            .map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load(Some(&project)).map_err(|e| miette::miette!("{}", e))?;
        let directory = SqliteDirectory::open(&project.database_path(&config))
            .map_err(ServiceError::from)?;
        Ok(Self {
            project,
            config,
            directory,
        })
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.directory, &self.config.auth, &self.config.registration)
    }

    /// Verify the caller's token
    pub fn session(&self, global: &GlobalOpts) -> Result<Session> {
        let token = global.token.as_deref().ok_or_else(|| {
            ServiceError::unauthenticated("Not logged in: pass --token or set GEARGUARD_TOKEN")
        })?;
        Ok(self.auth().verify(token)?)
    }

    pub fn requests(&self) -> RequestManager<'_> {
        RequestManager::new(&self.directory, &self.config.lifecycle)
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.directory)
    }

    pub fn stats(&self) -> StatsAggregator<'_> {
        StatsAggregator::new(&self.directory, &self.config.stats)
    }

    pub fn calendar(&self) -> CalendarProjector<'_> {
        CalendarProjector::new(&self.directory)
    }
}

/// Directory given by `-C`, or the working directory
pub fn start_dir(global: &GlobalOpts) -> Result<PathBuf> {
    match global.project {
        Some(ref dir) => Ok(dir.clone()),
        None => std::env::current_dir().into_diagnostic(),
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
pub fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid date '{}': use YYYY-MM-DD or RFC 3339", s))
}

pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': use YYYY-MM-DD", s))
}

/// Ask for a password on the terminal unless one was given
pub fn password_or_prompt(given: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().into_diagnostic()
}

/// `Some(Some(v))` to set, `Some(None)` to clear, `None` to leave alone
pub fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    match (value, clear) {
        (Some(v), _) => Some(Some(v)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

/// `-` for an absent value
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// `#id` for an optional reference
pub fn id_ref(id: Option<RecordId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| format!("#{}", id))
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
