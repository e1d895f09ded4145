use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{balances, enhancements, wishes};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/wishes", post(wishes::create))
        .route("/enhancements", post(enhancements::apply))
        .route("/enhancements/validate", post(enhancements::validate))
        .route(
            "/wishes/{wish_id}/enhancements",
            get(enhancements::list),
        )
        .route("/balance/{user_id}", get(balances::get))
        .route("/stats/{user_id}", get(balances::stats))
        .route("/mana/grant", post(balances::grant))
        .route("/costs", get(enhancements::costs))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO accounts (user_id, balance) VALUES (?, ?)",
            vec!["alice".into(), 100i64.into()],
        ))
        .await
        .unwrap();

        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn balance_endpoint_returns_seeded_balance() {
        let router = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/balance/alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["balance"], 100);
    }

    #[tokio::test]
    async fn unknown_account_returns_404() {
        let router = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/balance/nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn apply_enhancement_end_to_end() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(post_json(
                "/wishes",
                serde_json::json!({"owner_id": "alice", "title": "New bike"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let wish_id = json_body(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = router
            .clone()
            .oneshot(post_json(
                "/enhancements",
                serde_json::json!({
                    "wish_id": wish_id,
                    "user_id": "alice",
                    "kind": "priority",
                    "level": 2,
                    "aura_tag": null,
                    "context": null,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["enhancement"]["kind"], "priority");
        assert_eq!(body["enhancement"]["level"], 2);
        assert_eq!(body["remaining_balance"], 75);

        // The cached balance read must observe the committed debit.
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/balance/alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["balance"], 75);
    }

    #[tokio::test]
    async fn insufficient_balance_maps_to_422_with_code() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(post_json(
                "/wishes",
                serde_json::json!({"owner_id": "alice", "title": "Telescope"}),
            ))
            .await
            .unwrap();
        let wish_id = json_body(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = router
            .oneshot(post_json(
                "/enhancements",
                serde_json::json!({
                    "wish_id": wish_id,
                    "user_id": "alice",
                    "kind": "priority",
                    "level": 5,
                    "aura_tag": null,
                    "context": null,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
    }

    #[tokio::test]
    async fn costs_endpoint_exposes_the_schedule() {
        let router = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/costs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["schedule"]["priority:1"], 10);
        assert_eq!(body["schedule"]["aura"], 50);
    }
}
