//! Route table and router assembly.
//!
//! Every endpoint is one entry in [`ROUTES`]; the router is built from that
//! table once at startup and never mutated afterwards.

use axum::{
    routing::{on, MethodFilter, MethodRouter},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod books;
pub mod index;
pub mod render;
pub mod users;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Delete,
}

impl Verb {
    fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Delete => MethodFilter::DELETE,
        }
    }
}

/// The closed set of endpoints this service answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    Index,
    Health,
    ListUsers,
    CreateUser,
    GetUser,
    DeleteUser,
    ListBooks,
    CreateBook,
    GetBook,
    DeleteBook,
}

#[derive(Clone, Copy, Debug)]
pub struct RouteDef {
    pub verb: Verb,
    pub path: &'static str,
    pub kind: RouteKind,
}

const fn route(verb: Verb, path: &'static str, kind: RouteKind) -> RouteDef {
    RouteDef { verb, path, kind }
}

pub const ROUTES: &[RouteDef] = &[
    route(Verb::Get, "/", RouteKind::Index),
    route(Verb::Get, "/health", RouteKind::Health),
    route(Verb::Get, "/users", RouteKind::ListUsers),
    route(Verb::Post, "/users", RouteKind::CreateUser),
    route(Verb::Get, "/users/:user_id", RouteKind::GetUser),
    route(Verb::Delete, "/users/:user_id", RouteKind::DeleteUser),
    route(Verb::Get, "/users/:user_id/books", RouteKind::ListBooks),
    route(Verb::Post, "/users/:user_id/books", RouteKind::CreateBook),
    route(Verb::Get, "/users/:user_id/books/:book_id", RouteKind::GetBook),
    route(Verb::Delete, "/users/:user_id/books/:book_id", RouteKind::DeleteBook),
];

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

impl RouteDef {
    fn method_router(&self) -> MethodRouter<AppState> {
        let filter = self.verb.filter();
        match self.kind {
            RouteKind::Index => on(filter, index::index),
            RouteKind::Health => on(filter, health),
            RouteKind::ListUsers => on(filter, users::list_users),
            RouteKind::CreateUser => on(filter, users::create_user),
            RouteKind::GetUser => on(filter, users::get_user),
            RouteKind::DeleteUser => on(filter, users::delete_user),
            RouteKind::ListBooks => on(filter, books::list_books),
            RouteKind::CreateBook => on(filter, books::create_book),
            RouteKind::GetBook => on(filter, books::get_book),
            RouteKind::DeleteBook => on(filter, books::delete_book),
        }
    }
}

/// Build the full application router from [`ROUTES`].
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    ROUTES
        .iter()
        .fold(Router::new(), |router, def| router.route(def.path, def.method_router()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
