use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use tracing::info;

use models::{Book, BookId, User, UserId};
use service::ListOptions;

use crate::errors::ApiError;
use crate::routes::{render, users::NameForm};
use crate::state::AppState;

/// Every book route resolves its owner first; a missing user is a 404.
async fn owner(state: &AppState, user_id: String, out: &mut String) -> Result<User, ApiError> {
    let user = state.users.get(&(), &UserId::from(user_id)).await.map_err(ApiError::context("get user"))?;
    render::record(out, "User", &user);
    Ok(user)
}

pub async fn list_books(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(opts): Query<ListOptions>,
) -> Result<Response, ApiError> {
    let mut body = String::new();
    let user = owner(&state, user_id, &mut body).await?;
    let page = state.books.list(&user.id, &opts).await.map_err(ApiError::context("get book list"))?;
    render::page(&mut body, "Book", &page);
    Ok((StatusCode::OK, render::page_headers(&page), body).into_response())
}

pub async fn create_book(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Form(form): Form<NameForm>,
) -> Result<(StatusCode, String), ApiError> {
    let mut body = String::new();
    let user = owner(&state, user_id, &mut body).await?;
    models::user::validate_name(&form.name)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("create book error: {e}")))?;
    let id = state.ids.book_id().map_err(ApiError::context("create book"))?;
    let book = Book::new(id, &user.id, &form.name).map_err(|e| ApiError::context("create book")(e.into()))?;
    state.books.put(&user.id, &book).await.map_err(ApiError::context("create book"))?;
    info!(user_id = %user.id, book_id = %book.id, "book created");

    render::record(&mut body, "Book", &book);
    Ok((StatusCode::CREATED, body))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let mut body = String::new();
    let user = owner(&state, user_id, &mut body).await?;
    let book = state.books.get(&user.id, &BookId::from(book_id)).await.map_err(ApiError::context("get book"))?;
    render::record(&mut body, "Book", &book);
    Ok(body)
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let mut body = String::new();
    let user = owner(&state, user_id, &mut body).await?;
    let book = state.books.get(&user.id, &BookId::from(book_id)).await.map_err(ApiError::context("get book"))?;
    state.books.delete(&user.id, &book.id).await.map_err(ApiError::context("delete book"))?;
    info!(user_id = %user.id, book_id = %book.id, "book deleted");

    render::record(&mut body, "Deleted Book", &book);
    Ok(body)
}
