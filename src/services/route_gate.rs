use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    error::AppResult,
    models::ContentKind,
    services::session::SessionStore,
};

/// Client-side views
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Recommended,
    Review { kind: ContentKind, imdb_id: String },
}

impl Route {
    /// Parses a browser path, ignoring any query string, fragment or trailing slash
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["recommended"] => Some(Route::Recommended),
            ["review", kind, imdb_id] => ContentKind::parse(kind).map(|kind| Route::Review {
                kind,
                imdb_id: imdb_id.to_string(),
            }),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Recommended => "/recommended".to_string(),
            Route::Review { kind, imdb_id } => format!("/review/{}/{}", kind, imdb_id),
        }
    }

    /// Views reachable only with a session
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Recommended | Route::Review { .. })
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Signed in; protected views are reachable
    Open,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Append a history entry
    Push,
    /// Overwrite the current history entry
    Replace,
}

/// Instruction for the routing collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub mode: HistoryMode,
    /// Protected path that was asked for when this is a login redirect
    pub redirected_from: Option<String>,
}

impl Navigation {
    fn push(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: HistoryMode::Push,
            redirected_from: None,
        }
    }

    fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: HistoryMode::Replace,
            redirected_from: None,
        }
    }
}

/// Routing collaborator that performs the actual history change
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: &Navigation);
}

/// Decides whether a navigation may proceed, based only on the session store
///
/// While blocked, protected navigations are sent to the login view and the requested
/// path is remembered; the next successful login returns there.
pub struct RouteGate {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    landing_path: String,
    return_to: Mutex<Option<String>>,
}

impl RouteGate {
    pub fn new(
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        landing_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            navigator,
            landing_path: landing_path.into(),
            return_to: Mutex::new(None),
        }
    }

    pub fn state(&self) -> GateState {
        if self.session.is_authenticated() {
            GateState::Open
        } else {
            GateState::Blocked
        }
    }

    /// Routes a navigation attempt to `path`
    pub fn navigate(&self, path: &str) -> Navigation {
        let navigation = match Route::parse(path) {
            None => {
                tracing::warn!(path = %path, "Unknown route, sending to landing page");
                Navigation::push(self.landing_path.clone())
            }
            Some(route) if route.is_protected() && self.state() == GateState::Blocked => {
                let requested = route.path();
                tracing::info!(requested = %requested, "Protected route while signed out, redirecting to login");
                *self.lock_return_to() = Some(requested.clone());
                Navigation {
                    path: Route::Login.path(),
                    mode: HistoryMode::Push,
                    redirected_from: Some(requested),
                }
            }
            Some(route) => {
                if !route.is_protected() && route != Route::Login {
                    // Leaving the login flow abandons the pending redirect
                    self.lock_return_to().take();
                }
                Navigation::push(route.path())
            }
        };

        self.navigator.navigate(&navigation);
        navigation
    }

    /// Signs in and leaves the login view
    ///
    /// Lands on the remembered protected path if there is one, else on the landing path.
    /// Either way the login entry is replaced in history. A failed login navigates nowhere.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Navigation> {
        self.session.login(email, password).await?;

        let target = self.lock_return_to().take();
        let navigation = match target {
            Some(path) => Navigation::replace(path),
            None => Navigation::replace(self.landing_path.clone()),
        };

        tracing::debug!(path = %navigation.path, "Post-login navigation");
        self.navigator.navigate(&navigation);
        Ok(navigation)
    }

    pub fn logout(&self) {
        self.lock_return_to().take();
        self.session.logout();
    }

    /// Leaves the register view for login once an account was created
    pub fn registration_complete(&self) -> Navigation {
        let navigation = Navigation::replace(Route::Login.path());
        self.navigator.navigate(&navigation);
        navigation
    }

    /// Path a successful login would return to
    pub fn pending_redirect(&self) -> Option<String> {
        self.lock_return_to().clone()
    }

    fn lock_return_to(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.return_to.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
