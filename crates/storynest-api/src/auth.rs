use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::error;

use storynest_db::Database;
use storynest_types::api::{Flash, FormView, LoginForm, RegisterForm};

use crate::error::ServiceError;
use crate::flash;
use crate::password::CredentialStore;
use crate::registry;
use crate::session::{self, SessionSettings};

pub type AppState = Arc<AppStateInner>;

/// Services shared by every handler, built once at start-up.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub credentials: CredentialStore,
    pub sessions: SessionSettings,
}

/// Runs store and hashing work off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ServiceError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ServiceError::Storage(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}

pub async fn register_form(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let flash = flash::take(&session).await?;
    Ok(Json(FormView { flash }))
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ServiceError> {
    let user = blocking(&state, move |app| {
        registry::register(&app.db, &app.credentials, &form)
    })
    .await?;

    session::sign_in(&session, &user).await?;

    Ok(flash::redirect(
        "/dashboard",
        Flash::success(format!(
            "Welcome to StoryNest, {}! Start writing your first story.",
            user.username
        )),
    ))
}

pub async fn login_form(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let flash = flash::take(&session).await?;
    Ok(Json(FormView { flash }))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ServiceError> {
    let user = blocking(&state, move |app| {
        registry::authenticate(&app.db, &app.credentials, &form)
    })
    .await?;

    session::sign_in(&session, &user).await?;

    Ok(flash::redirect(
        "/dashboard",
        Flash::success(format!("Welcome back, {}!", user.username)),
    ))
}

pub async fn logout(session: Session) -> Result<Response, ServiceError> {
    session::sign_out(&session).await?;
    Ok(flash::redirect("/", Flash::success("You have been logged out.")))
}
