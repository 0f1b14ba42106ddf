use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api_error::ApiError;
use crate::manager::chat_manager::ChatManager;
use crate::router::Params;
use crate::utils::{optional_id, parse_id};

#[derive(Deserialize)]
pub struct NewChatForm {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    chat_type: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    user_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct SendMessageForm {
    #[serde(default, deserialize_with = "optional_id")]
    chat_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    user_id: Option<i64>,
    #[serde(default)]
    text: String,
}

pub async fn list_chats(pool: &sqlx::SqlitePool, params: &Params) -> Result<Response, ApiError> {
    let user_id = parse_id(params.user_id.as_deref(), "user_id")?;
    let chats = ChatManager::new(pool).list_chats(user_id).await?;
    Ok(Json(json!({ "chats": chats })).into_response())
}

pub async fn try_new_chat(pool: &sqlx::SqlitePool, form: NewChatForm) -> Result<Response, ApiError> {
    let chat = ChatManager::new(pool)
        .create_chat(&form.name, form.chat_type.as_deref(), form.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(chat)).into_response())
}

pub async fn list_messages(pool: &sqlx::SqlitePool, params: &Params) -> Result<Response, ApiError> {
    let chat_id = parse_id(params.chat_id.as_deref(), "chat_id")?;
    let messages = ChatManager::new(pool).list_messages(chat_id).await?;
    Ok(Json(json!({ "messages": messages })).into_response())
}

pub async fn try_send_message(
    pool: &sqlx::SqlitePool,
    form: SendMessageForm,
) -> Result<Response, ApiError> {
    let message = ChatManager::new(pool)
        .send_message(form.chat_id, form.user_id, &form.text)
        .await?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}
