//! Core module - the request engine and its supporting services

pub mod assignment;
pub mod authz;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod project;
pub mod session;
pub mod stats;

pub use assignment::{Assignment, AssignmentResolver};
pub use authz::{Action, AuthorizationMatrix, Decision, ResourceKind, Scope};
pub use calendar::{CalendarEvent, CalendarProjector};
pub use catalog::Catalog;
pub use config::{Config, ConfigError};
pub use directory::{DirectoryError, ResourceDirectory, SqliteDirectory};
pub use entity::{AssetStatus, Priority, Record, RecordId};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use lifecycle::{RequestManager, StageTable};
pub use project::{Project, ProjectError};
pub use session::{AuthService, Registration, Session};
pub use stats::{HealthScorer, Stats, StatsAggregator, StatusHealthScorer};
