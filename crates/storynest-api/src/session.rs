//! Server-side sessions and the identity values handlers receive.
//!
//! The browser only holds an opaque session id; who is signed in (and any
//! pending flash notice) lives in the session record on the server.

use anyhow::bail;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use storynest_types::models::User;

pub const SESSION_COOKIE: &str = "storynest_session";

/// Key for storing the signed-in user's id in the session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

pub const MAX_SESSION_DAYS: i64 = 3650;

/// The authenticated actor for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Who is making the request; anonymous unless the session names a live user.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    user: Option<CurrentUser>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Lifetime and cookie flags for the session layer.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    expiry: Expiry,
    secure_cookies: bool,
}

impl SessionSettings {
    /// Sessions lapse after `days` without a request.
    pub fn new(days: i64, secure_cookies: bool) -> anyhow::Result<Self> {
        if !(1..=MAX_SESSION_DAYS).contains(&days) {
            bail!("session lifetime must be between 1 and {} days, got {}", MAX_SESSION_DAYS, days);
        }
        Ok(Self {
            expiry: Expiry::OnInactivity(time::Duration::days(days)),
            secure_cookies,
        })
    }

    pub fn layer<S: SessionStore + Clone>(&self, store: S) -> SessionManagerLayer<S> {
        SessionManagerLayer::new(store)
            .with_name(SESSION_COOKIE)
            .with_http_only(true)
            .with_secure(self.secure_cookies)
            .with_same_site(SameSite::Lax)
            .with_expiry(self.expiry.clone())
    }
}

/// Binds `user` to the session under a fresh id.
pub async fn sign_in(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user.id).await
}

/// Drops everything the session held, including the stored record.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// The user id the session is bound to, if any.
pub async fn user_id(session: &Session) -> Result<Option<i64>, tower_sessions::session::Error> {
    session.get::<i64>(SESSION_USER_ID_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use tower_sessions::MemoryStore;

    fn user() -> User {
        User {
            id: 7,
            username: "alice".into(),
            email: "alice@x.com".into(),
            created_at: Utc::now(),
        }
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn lifetime_is_bounded() {
        assert!(SessionSettings::new(30, false).is_ok());
        assert!(SessionSettings::new(MAX_SESSION_DAYS, true).is_ok());
        assert!(SessionSettings::new(0, false).is_err());
        assert!(SessionSettings::new(-2, false).is_err());
        assert!(SessionSettings::new(100_000_000, false).is_err());
        assert!(SessionSettings::new(i64::MAX, false).is_err());
    }

    #[tokio::test]
    async fn sign_in_then_out() {
        let session = session();
        assert_eq!(user_id(&session).await.unwrap(), None);

        sign_in(&session, &user()).await.unwrap();
        assert_eq!(user_id(&session).await.unwrap(), Some(7));

        sign_out(&session).await.unwrap();
        assert_eq!(user_id(&session).await.unwrap(), None);
    }

    #[test]
    fn viewer_defaults_to_anonymous() {
        let viewer = Viewer::default();
        assert!(!viewer.is_authenticated());
        assert!(viewer.user().is_none());

        let viewer = Viewer::authenticated(CurrentUser { id: 1, username: "a".into() });
        assert_eq!(viewer.user().map(|u| u.id), Some(1));
    }
}
