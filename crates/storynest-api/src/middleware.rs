use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, error};

use storynest_types::api::Flash;

use crate::auth::{AppState, blocking};
use crate::flash;
use crate::session::{self, CurrentUser, Viewer};

/// Resolve the session into a [`Viewer`] extension. Runs on every route.
///
/// A session is only honoured while its user still exists. On the way out,
/// any flash attached to the response is moved into the session.
pub async fn load_session(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Response {
    let viewer = match session::user_id(&session).await {
        Ok(None) => Viewer::anonymous(),
        Ok(Some(user_id)) => {
            let found = blocking(&state, move |app| Ok(app.db.get_user_by_id(user_id)?)).await;
            match found {
                Ok(Some(row)) => Viewer::authenticated(CurrentUser {
                    id: row.id,
                    username: row.username,
                }),
                Ok(None) => {
                    debug!("Session names missing user {}", user_id);
                    Viewer::anonymous()
                }
                Err(e) => {
                    error!("Session lookup failed: {}", e);
                    Viewer::anonymous()
                }
            }
        }
        Err(e) => {
            error!("Session load failed: {}", e);
            Viewer::anonymous()
        }
    };

    req.extensions_mut().insert(viewer);
    let mut res = next.run(req).await;

    if let Err(e) = flash::store_pending(&session, &mut res).await {
        error!("Dropping flash notice: {}", e);
    }
    res
}

/// Gate for author-only routes: anonymous requests go to the login page.
pub async fn require_auth(mut req: Request, next: Next) -> Response {
    let user = req
        .extensions()
        .get::<Viewer>()
        .and_then(|viewer| viewer.user().cloned());

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => flash::redirect("/login", Flash::error("Please log in to access this page.")),
    }
}

/// Login and registration are pointless once signed in.
pub async fn guest_only(req: Request, next: Next) -> Response {
    let signed_in = req
        .extensions()
        .get::<Viewer>()
        .is_some_and(Viewer::is_authenticated);

    if signed_in {
        return Redirect::to("/dashboard").into_response();
    }
    next.run(req).await
}
