use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod balances;
mod enhancements;
mod server;
mod wishes;

pub mod types {
    pub mod enhancement {
        pub use api_types::enhancement::{
            ApplyEnhancement, ApplyEnhancementResponse, EnhancementListResponse, EnhancementView,
            VerdictView,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceResponse, GrantMana, ManaStatsResponse};
    }

    pub mod wish {
        pub use api_types::wish::{WishCreated, WishNew};
    }

    pub mod costs {
        pub use api_types::costs::CostScheduleResponse;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    code: &'static str,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_)
        | EngineError::InsufficientBalance { .. }
        | EngineError::BalanceCeilingExceeded(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, code) = match self {
            ServerError::Engine(err) => {
                let code = err.code();
                (status_for_engine_error(&err), message_for_engine_error(err), code)
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err, "BAD_REQUEST"),
        };

        (status, Json(Error { error, code })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("locked".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_unavailable_maps_to_503() {
        let res = ServerError::from(EngineError::Unavailable("down".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("bad level".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn insufficient_balance_maps_to_422() {
        let res = ServerError::from(EngineError::InsufficientBalance {
            required: 50,
            available: 30,
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
