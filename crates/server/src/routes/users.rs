use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

use models::{User, UserId};
use service::ListOptions;

use crate::errors::ApiError;
use crate::routes::render;
use crate::state::AppState;

/// Body of the create forms.
#[derive(Debug, Deserialize)]
pub struct NameForm {
    #[serde(default)]
    pub name: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(opts): Query<ListOptions>,
) -> Result<Response, ApiError> {
    let page = state.users.list(&(), &opts).await.map_err(ApiError::context("get user list"))?;
    let mut body = String::new();
    render::page(&mut body, "User", &page);
    Ok((StatusCode::OK, render::page_headers(&page), body).into_response())
}

pub async fn create_user(
    State(state): State<AppState>,
    Form(form): Form<NameForm>,
) -> Result<(StatusCode, String), ApiError> {
    models::user::validate_name(&form.name)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("create user error: {e}")))?;
    let id = state.ids.user_id().map_err(ApiError::context("create user"))?;
    let user = User::new(id, &form.name).map_err(|e| ApiError::context("create user")(e.into()))?;
    state.users.put(&(), &user).await.map_err(ApiError::context("create user"))?;
    info!(user_id = %user.id, "user created");

    let mut body = String::new();
    render::record(&mut body, "User", &user);
    Ok((StatusCode::CREATED, body))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<String, ApiError> {
    let user = state.users.get(&(), &UserId::from(user_id)).await.map_err(ApiError::context("get user"))?;
    let mut body = String::new();
    render::record(&mut body, "User", &user);
    Ok(body)
}

/// Fetches before deleting so the response can echo the removed record.
/// Books owned by the user are left in place.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<String, ApiError> {
    let id = UserId::from(user_id);
    let user = state.users.get(&(), &id).await.map_err(ApiError::context("get user"))?;
    state.users.delete(&(), &user.id).await.map_err(ApiError::context("delete user"))?;
    info!(user_id = %user.id, "user deleted");

    let mut body = String::new();
    render::record(&mut body, "Deleted User", &user);
    Ok(body)
}
