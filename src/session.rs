use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    api::ApiState,
    models::{Credentials, UserProfile},
    storage::TokenState,
};

/// Message reported by a failed login when the backend payload has none.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Error signing in";

/// SessionPhase
///
/// `Unknown` and `Restoring` are the loading phases: nothing may be authorized while the
/// session is in either of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Process just started, `initialize()` has not run.
    Unknown,
    /// A persisted token was found and the profile fetch is in flight.
    Restoring,
    Authenticated,
    Anonymous,
}

/// Session
///
/// Snapshot of the session published to subscribers on every transition.
/// `identity` is `Some` exactly when the phase is `Authenticated`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: SessionPhase,
    pub identity: Option<UserProfile>,
}

impl Session {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Unknown | SessionPhase::Restoring)
    }

    fn authenticated(identity: UserProfile) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            identity: Some(identity),
        }
    }

    fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            identity: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Unknown,
            identity: None,
        }
    }
}

/// LoginError
///
/// A failed login, carrying the message to show the user: the backend's `mensaje` or
/// [`LOGIN_FALLBACK_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct LoginError {
    pub message: String,
}

/// SessionStore
///
/// Owns the authenticated identity and the persisted token. It is created once per process,
/// `initialize()`d once at startup and afterwards only changed through `login` and `logout`.
/// Views receive it explicitly (usually as [`SessionState`]) and subscribe to its
/// transitions instead of polling.
pub struct SessionStore {
    api: ApiState,
    tokens: TokenState,
    state: watch::Sender<Session>,
}

/// SessionState
///
/// Shared handle to the session store.
pub type SessionState = Arc<SessionStore>;

impl SessionStore {
    pub fn new(api: ApiState, tokens: TokenState) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { api, tokens, state }
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver notified on every transition. The current value is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// initialize
    ///
    /// Restores the session from the persisted token. Runs once: calls made after the
    /// session has left `Unknown` return the current snapshot untouched.
    ///
    /// * No token: `Anonymous`, no backend call.
    /// * Token accepted by `GET /auth/perfil`: `Authenticated`, token kept.
    /// * Any failure (rejected token, network, unreadable store): token removed, `Anonymous`.
    /// * A login or logout completed during the profile fetch is kept as is.
    ///
    /// Always leaves the loading phases.
    pub async fn initialize(&self) -> Session {
        if self.snapshot().phase != SessionPhase::Unknown {
            return self.snapshot();
        }

        let token = match self.tokens.load().await {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted token, starting anonymous");
                self.discard_token().await;
                return self.publish(Session::anonymous());
            }
        };

        if token.is_none() {
            tracing::info!("no persisted token, starting anonymous");
            return self.publish(Session::anonymous());
        }

        self.publish(Session {
            phase: SessionPhase::Restoring,
            identity: None,
        });

        // A login or logout may land while the profile fetch is in flight; its outcome wins.
        match self.api.get_profile().await {
            Ok(identity) => {
                let user = identity.nombre.clone();
                if self.publish_if_restoring(Session::authenticated(identity)) {
                    tracing::info!(%user, "session restored");
                }
            }
            Err(err) => {
                if self.publish_if_restoring(Session::anonymous()) {
                    tracing::info!(error = %err, "persisted token rejected, forcing logout");
                    self.discard_token().await;
                }
            }
        }
        self.snapshot()
    }

    /// login
    ///
    /// Exchanges credentials for a token. On success the token is persisted and the session
    /// becomes `Authenticated` with the returned profile. On failure the session is left
    /// exactly as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, LoginError> {
        let response = self.api.login(credentials).await.map_err(|err| {
            tracing::info!(error = %err, "login rejected");
            LoginError {
                message: err.message_or(LOGIN_FALLBACK_MESSAGE),
            }
        })?;

        if let Err(err) = self.tokens.save(&response.token).await {
            tracing::warn!(error = %err, "could not persist token after login");
            return Err(LoginError {
                message: LOGIN_FALLBACK_MESSAGE.to_string(),
            });
        }

        tracing::info!(user = %response.profile.nombre, "logged in");
        self.publish(Session::authenticated(response.profile.clone()));
        Ok(response.profile)
    }

    /// logout
    ///
    /// Drops the token and the identity. Never fails and never calls the backend; a store
    /// that cannot be cleared is only logged.
    pub async fn logout(&self) -> Session {
        self.discard_token().await;
        tracing::info!("logged out");
        self.publish(Session::anonymous())
    }

    async fn discard_token(&self) {
        if let Err(err) = self.tokens.clear().await {
            tracing::warn!(error = %err, "could not remove persisted token");
        }
    }

    /// Publishes `session` only while a restore is pending. Returns whether it applied.
    fn publish_if_restoring(&self, session: Session) -> bool {
        self.state.send_if_modified(|current| {
            if current.phase != SessionPhase::Restoring {
                return false;
            }
            *current = session;
            true
        })
    }

    fn publish(&self, session: Session) -> Session {
        self.state.send_replace(session.clone());
        session
    }
}
