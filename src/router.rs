use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderName, Method},
    response::{IntoResponse, Response},
    routing, Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api_error::ApiError;
use crate::{call_view, chat_view, contact_view, login_view, AppState};

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Query-string parameters shared by every action.
#[derive(Deserialize, Debug)]
pub struct Params {
    #[serde(default)]
    pub action: String,
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
    pub query: Option<String>,
}

pub fn app(pool: sqlx::SqlitePool) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-user-id")])
        .max_age(CORS_MAX_AGE);

    axum::Router::new()
        .route(
            "/",
            routing::get(handle_get)
                .post(handle_post)
                .fallback(handle_other),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { pool }))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed request body: {e}")))
}

fn unknown_action(method: &Method, action: &str) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "method": method.as_str(),
        "action": action,
    }))
    .into_response()
}

async fn handle_get(State(state): State<Arc<AppState>>, Query(params): Query<Params>) -> Response {
    let pool = &state.pool;
    let result = match params.action.as_str() {
        "chats" => chat_view::list_chats(pool, &params).await,
        "messages" => chat_view::list_messages(pool, &params).await,
        "search_users" => contact_view::search_users(pool, &params).await,
        "contacts" => contact_view::list_contacts(pool, &params).await,
        "call_history" => call_view::list_call_history(pool, &params).await,
        action => Ok(unknown_action(&Method::GET, action)),
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

async fn handle_post(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Response {
    dispatch_post(&state.pool, &params.action, &body)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

async fn dispatch_post(
    pool: &sqlx::SqlitePool,
    action: &str,
    body: &[u8],
) -> Result<Response, ApiError> {
    match action {
        "login" | "register" => login_view::try_login(pool, parse_body(body)?).await,
        "create_chat" => chat_view::try_new_chat(pool, parse_body(body)?).await,
        "send_message" => chat_view::try_send_message(pool, parse_body(body)?).await,
        "add_contact" => contact_view::try_add_contact(pool, parse_body(body)?).await,
        "start_call" => call_view::try_start_call(pool, parse_body(body)?).await,
        "end_call" => call_view::try_end_call(pool, parse_body(body)?).await,
        _ => Ok(unknown_action(&Method::POST, action)),
    }
}

async fn handle_other(method: Method, Query(params): Query<Params>) -> Response {
    unknown_action(&method, &params.action)
}
