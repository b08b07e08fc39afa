//! The four request handlers. Each one is a single-shot translation:
//! at most one store operation, then a serialized response. Store errors
//! stop at this boundary as a 503, they never take the process down.
use std::{collections::BTreeMap, env, sync::Arc};

use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::{
    database::{list_append, list_get_all, raw_info},
    error::AppError,
    state::AppState,
};

pub async fn list_range_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    range_response(&state, &key).await
}

pub async fn list_push_handler(
    State(state): State<Arc<AppState>>,
    Path((key, value)): Path<(String, String)>,
) -> Result<Response, AppError> {
    list_append(state.primary.clone(), &key, &value).await?;

    // Read back through the replica, exactly like a plain /lrange. The
    // replica may not have applied the write yet and the response will
    // then miss it; that lag is part of the contract.
    range_response(&state, &key).await
}

async fn range_response(state: &AppState, key: &str) -> Result<Response, AppError> {
    let members = list_get_all(state.replica.clone(), key).await?;
    let body = serde_json::to_string(&members)?;

    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn info_handler(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let info = raw_info(state.primary.clone()).await?;

    Ok(([(CONTENT_TYPE, "text/plain")], info).into_response())
}

pub async fn env_handler() -> Result<Response, AppError> {
    let body = serde_json::to_string(&env_snapshot())?;

    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

/// Fresh view of the process environment, taken per request. `BTreeMap`
/// keeps the JSON object in deterministic key order.
fn env_snapshot() -> BTreeMap<String, String> {
    env::vars().collect()
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_env_snapshot_contains_set_variables() {
        env::set_var("GUESTBOOK_TEST_PLAIN", "hello");

        let snapshot = env_snapshot();
        assert_eq!(snapshot.get("GUESTBOOK_TEST_PLAIN").unwrap(), "hello");
    }

    #[test]
    fn test_env_snapshot_keeps_equals_in_values() {
        env::set_var("GUESTBOOK_TEST_EQUALS", "a=b=c");

        let snapshot = env_snapshot();
        assert_eq!(snapshot.get("GUESTBOOK_TEST_EQUALS").unwrap(), "a=b=c");
    }

    #[tokio::test]
    async fn test_env_route_returns_json_object() {
        env::set_var("GUESTBOOK_TEST_ROUTE", "seen");

        let app = Router::new().route("/env", get(env_handler));
        let response = app
            .oneshot(Request::builder().uri("/env").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["GUESTBOOK_TEST_ROUTE"], "seen");
    }
}
