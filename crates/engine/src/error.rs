//! The module contains the errors the engine can throw.
//!
//! Every variant carries a stable machine-readable [`code`] so callers at the
//! API boundary can branch without parsing display strings. [`Conflict`] and
//! [`Unavailable`] are the only retryable variants; everything else requires
//! the caller to change the request.
//!
//! [`code`]: EngineError::code
//! [`Conflict`]: EngineError::Conflict
//! [`Unavailable`]: EngineError::Unavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },
    #[error("balance ceiling exceeded: {0}")]
    BalanceCeilingExceeded(String),
    #[error("\"{0}\" not found")]
    KeyNotFound(String),
    #[error("transaction conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Stable machine-readable code exposed across the interface boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::BalanceCeilingExceeded(_) => "BALANCE_CEILING_EXCEEDED",
            Self::KeyNotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONCURRENCY_CONFLICT",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Database(_) => "INTERNAL",
        }
    }

    /// Whether the caller may retry the whole operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Unavailable(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Unavailable(err.to_string()),
            DbErr::Exec(_) | DbErr::Query(_) => {
                let message = err.to_string();
                // Sqlite reports writer contention as "database is locked";
                // other backends use serialization/deadlock wording. A unique
                // index violation is two writers racing on the same slot.
                if message.contains("database is locked")
                    || message.contains("deadlock")
                    || message.contains("could not serialize")
                    || message.contains("UNIQUE constraint failed")
                {
                    Self::Conflict(message)
                } else {
                    Self::Database(err)
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::InsufficientBalance {
                    required: ar,
                    available: aa,
                },
                Self::InsufficientBalance {
                    required: br,
                    available: ba,
                },
            ) => ar == br && aa == ba,
            (Self::BalanceCeilingExceeded(a), Self::BalanceCeilingExceeded(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_variants() {
        assert!(EngineError::Conflict("locked".to_string()).is_retryable());
        assert!(EngineError::Unavailable("down".to_string()).is_retryable());
        assert!(
            !EngineError::InsufficientBalance {
                required: 50,
                available: 30
            }
            .is_retryable()
        );
        assert!(!EngineError::Validation("bad level".to_string()).is_retryable());
    }

    #[test]
    fn locked_database_maps_to_conflict() {
        let err = EngineError::from(DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "database is locked".to_string(),
        )));
        assert_eq!(err.code(), "CONCURRENCY_CONFLICT");
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = EngineError::from(DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "UNIQUE constraint failed: enhancements.wish_id, enhancements.kind".to_string(),
        )));
        assert_eq!(err.code(), "CONCURRENCY_CONFLICT");
        assert!(err.is_retryable());
    }

    #[test]
    fn connection_failure_maps_to_unavailable() {
        let err = EngineError::from(DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }
}
