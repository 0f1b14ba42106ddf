use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api_error::ApiError;
use crate::manager::call_manager::CallManager;
use crate::router::Params;
use crate::utils::{optional_id, parse_id};

#[derive(Deserialize)]
pub struct StartCallForm {
    #[serde(default, deserialize_with = "optional_id")]
    caller_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    receiver_id: Option<i64>,
    call_type: Option<String>,
}

#[derive(Deserialize)]
pub struct EndCallForm {
    #[serde(default, deserialize_with = "optional_id")]
    call_id: Option<i64>,
    status: Option<String>,
}

pub async fn try_start_call(
    pool: &sqlx::SqlitePool,
    form: StartCallForm,
) -> Result<Response, ApiError> {
    let call = CallManager::new(pool)
        .start_call(form.caller_id, form.receiver_id, form.call_type.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(call)).into_response())
}

pub async fn try_end_call(pool: &sqlx::SqlitePool, form: EndCallForm) -> Result<Response, ApiError> {
    let duration = CallManager::new(pool)
        .end_call(form.call_id, form.status.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "duration": duration })).into_response())
}

pub async fn list_call_history(
    pool: &sqlx::SqlitePool,
    params: &Params,
) -> Result<Response, ApiError> {
    let user_id = parse_id(params.user_id.as_deref(), "user_id")?;
    let calls = CallManager::new(pool).list_call_history(user_id).await?;
    Ok(Json(json!({ "calls": calls })).into_response())
}
