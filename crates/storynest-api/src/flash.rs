//! One-shot flash notices carried from a redirect to the next view.
//!
//! Handlers attach the notice to their redirect response; `load_session`
//! moves it into the session, and the next view takes it back out.

use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use storynest_types::api::Flash;

/// Session key holding the pending notice.
pub const FLASH_KEY: &str = "flash";

/// Notice riding on a response until the session layer stores it.
#[derive(Debug, Clone)]
pub(crate) struct PendingFlash(pub(crate) Flash);

/// 303 to `to`, leaving `flash` for the page that follows.
pub fn redirect(to: &str, flash: Flash) -> Response {
    let mut res = Redirect::to(to).into_response();
    res.extensions_mut().insert(PendingFlash(flash));
    res
}

/// Moves a notice attached by [`redirect`] into the session.
pub async fn store_pending(session: &Session, res: &mut Response) -> Result<(), tower_sessions::session::Error> {
    match res.extensions_mut().remove::<PendingFlash>() {
        Some(PendingFlash(flash)) => session.insert(FLASH_KEY, flash).await,
        None => Ok(()),
    }
}

/// Reads the pending notice, if any, and clears it.
pub async fn take(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    // Only touch the session when there is something to clear.
    if session.get::<Flash>(FLASH_KEY).await?.is_none() {
        return Ok(None);
    }
    session.remove::<Flash>(FLASH_KEY).await
}
