use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::api_error::ApiError;
use crate::manager::login_manager::LoginManager;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
}

/// Serves both `login` and `register`; the first login registers.
pub async fn try_login(pool: &sqlx::SqlitePool, form: LoginForm) -> Result<Response, ApiError> {
    let user = LoginManager::new(pool)
        .login_or_register(&form.username)
        .await?;
    Ok(Json(user).into_response())
}
