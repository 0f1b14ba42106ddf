use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api_error::ApiError;
use crate::manager::{contact_manager::ContactManager, user_manager::UserManager};
use crate::router::Params;
use crate::utils::{optional_id, parse_id};

#[derive(Deserialize)]
pub struct AddContactForm {
    #[serde(default, deserialize_with = "optional_id")]
    user_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    contact_user_id: Option<i64>,
}

pub async fn search_users(pool: &sqlx::SqlitePool, params: &Params) -> Result<Response, ApiError> {
    let term = params.query.as_deref().unwrap_or_default();
    let users = UserManager::new(pool).search_users(term).await?;
    Ok(Json(json!({ "users": users })).into_response())
}

pub async fn try_add_contact(
    pool: &sqlx::SqlitePool,
    form: AddContactForm,
) -> Result<Response, ApiError> {
    ContactManager::new(pool)
        .add_contact(form.user_id, form.contact_user_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Contact added" })),
    )
        .into_response())
}

pub async fn list_contacts(pool: &sqlx::SqlitePool, params: &Params) -> Result<Response, ApiError> {
    let user_id = parse_id(params.user_id.as_deref(), "user_id")?;
    let contacts = ContactManager::new(pool).list_contacts(user_id).await?;
    Ok(Json(json!({ "contacts": contacts })).into_response())
}
