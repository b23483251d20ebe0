use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    api::AuthApi,
    error::{AppError, AppResult},
    models::{LoginRequest, Session},
};

/// Owner of the authenticated identity
///
/// The store is the only writer of the session. Everyone else reads it through
/// [`SessionStore::current_session`] or a [`watch::Receiver`] from [`SessionStore::subscribe`].
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    session_tx: watch::Sender<Option<Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthApi>, ttl: Duration) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            auth,
            session_tx,
            ttl,
        }
    }

    /// Authenticates against the backend and stores the resulting session
    ///
    /// Does not retry. A rejected login leaves any existing session untouched.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = self.auth.login(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "Login failed");
            e
        })?;

        let session = Session::from_login(response, Utc::now(), self.ttl);

        tracing::info!(
            user_id = %session.user_id,
            expires_at = %session.expires_at,
            "Signed in"
        );

        self.session_tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Clears the session; calling it while signed out is a no-op
    pub fn logout(&self) {
        if self.session_tx.send_replace(None).is_some() {
            tracing::info!("Signed out");
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current_session_at(Utc::now())
    }

    /// Current session as seen at `now`; an expired session is cleared and reported absent
    pub fn current_session_at(&self, now: DateTime<Utc>) -> Option<Session> {
        let session = self.session_tx.borrow().clone()?;
        if !session.is_expired_at(now) {
            return Some(session);
        }

        self.clear_if_expired(now);
        // A login may have replaced the expired session in the meantime
        self.session_tx
            .borrow()
            .clone()
            .filter(|s| !s.is_expired_at(now))
    }

    /// Drops the stored session only if it is still expired at `now`
    fn clear_if_expired(&self, now: DateTime<Utc>) -> bool {
        self.session_tx.send_if_modified(|current| {
            match current {
                Some(session) if session.is_expired_at(now) => {
                    tracing::info!(user_id = %session.user_id, "Session expired");
                    *current = None;
                    true
                }
                _ => false,
            }
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    /// Bearer token of the current session
    pub fn token(&self) -> Option<String> {
        self.current_session().map(|s| s.token)
    }

    /// Name shown by the header's signed-in indicator
    pub fn display_name(&self) -> Option<String> {
        self.current_session().map(|s| s.first_name)
    }

    /// Receiver notified on every sign-in and sign-out
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.session_tx.borrow().is_some())
            .field("ttl", &self.ttl)
            .finish()
    }
}
