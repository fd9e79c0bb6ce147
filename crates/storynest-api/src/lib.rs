pub mod articles;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod flash;
pub mod format;
pub mod middleware;
pub mod pages;
pub mod password;
pub mod registry;
pub mod search;
pub mod session;
pub mod session_store;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::auth::AppState;
use crate::middleware::{guest_only, load_session, require_auth};
use crate::session_store::SqliteStore;

/// Every route of the site, behind the session layer. The caller adds
/// transport layers (tracing etc.).
pub fn router(state: AppState) -> Router {
    let session_layer = state.sessions.layer(SqliteStore::new(state.db.clone()));

    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/article/{id}", get(pages::article))
        .route("/contact", get(pages::contact_form).post(pages::submit_contact))
        .route("/search", get(pages::search))
        .route("/health", get(pages::health));

    let guest_routes = Router::new()
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route_layer(from_fn(guest_only));

    let protected_routes = Router::new()
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route(
            "/admin/add",
            get(dashboard::new_article_form).post(dashboard::create_article),
        )
        .route(
            "/admin/edit/{id}",
            get(dashboard::edit_article_form).post(dashboard::update_article),
        )
        .route("/admin/delete/{id}", post(dashboard::delete_article))
        .route_layer(from_fn(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(guest_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(state.clone(), load_session))
        .layer(session_layer)
        .with_state(state)
}
