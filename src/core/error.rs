//! Engine error type
//!
//! Every failure surfaces to the caller with a stable kind and a message.
//! None of these are transient; callers must not retry them.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::authz::{Action, ResourceKind};
use crate::core::directory::DirectoryError;
use crate::entities::user::Role;

/// Stable classification of a [`ServiceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Unauthenticated,
    Storage,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Storage => "storage_error",
            ErrorKind::Config => "config_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by engine operations
#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("{message}")]
    #[diagnostic(code(gearguard::validation_error))]
    Validation { message: String },

    #[error("{kind} {id} not found")]
    #[diagnostic(code(gearguard::not_found))]
    NotFound { kind: &'static str, id: String },

    #[error("{role} is not allowed to {action} {resource}")]
    #[diagnostic(
        code(gearguard::forbidden),
        help("Ask an administrator for a role with this permission")
    )]
    Forbidden {
        role: Role,
        action: Action,
        resource: ResourceKind,
    },

    #[error("{message}")]
    #[diagnostic(code(gearguard::forbidden))]
    OutOfScope { message: String },

    /// Reserved for optimistic locking; nothing raises it yet
    #[error("{message}")]
    #[diagnostic(code(gearguard::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(gearguard::unauthenticated),
        help("Log in with `gearguard login` and pass the token via --token or GEARGUARD_TOKEN")
    )]
    Unauthenticated { message: String },

    #[error(transparent)]
    #[diagnostic(code(gearguard::storage_error))]
    Directory(#[from] DirectoryError),

    #[error("Configuration error: {message}")]
    #[diagnostic(code(gearguard::config_error))]
    Config { message: String },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ServiceError::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation { .. } => ErrorKind::Validation,
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::Forbidden { .. } | ServiceError::OutOfScope { .. } => {
                ErrorKind::Forbidden
            }
            ServiceError::Conflict { .. } => ErrorKind::Conflict,
            ServiceError::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            ServiceError::Directory(_) => ErrorKind::Storage,
            ServiceError::Config { .. } => ErrorKind::Config,
        }
    }
}

/// Shorthand for engine results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(
            ServiceError::validation("bad").kind().as_str(),
            "validation_error"
        );
        assert_eq!(ServiceError::not_found("request", 4).kind().as_str(), "not_found");
        assert_eq!(
            ServiceError::OutOfScope {
                message: "nope".into()
            }
            .kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ServiceError::not_found("equipment", 7).to_string(),
            "equipment 7 not found"
        );
        let err = ServiceError::Forbidden {
            role: Role::Employee,
            action: Action::Create,
            resource: ResourceKind::Request,
        };
        assert_eq!(err.to_string(), "EMPLOYEE is not allowed to create request");
    }
}
