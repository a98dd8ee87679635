use tokio::sync::watch;

use crate::{
    routes::{Navigation, Route},
    session::Session,
};

/// GateDecision
///
/// What to do with a protected page given the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still being restored: show a neutral "verifying access" placeholder.
    Loading,
    /// No identity: leave for the login page, replacing the current history entry.
    Redirect(Navigation),
    /// Render the protected content unchanged.
    Allow,
}

/// Text shown while the gate is [`GateDecision::Loading`].
pub const VERIFYING_PLACEHOLDER: &str = "Verifying access...";

/// evaluate
///
/// The gate itself: a pure function of the session.
pub fn evaluate(session: &Session) -> GateDecision {
    if session.is_loading() {
        return GateDecision::Loading;
    }
    match session.identity {
        None => GateDecision::Redirect(Navigation::replace(Route::Login)),
        Some(_) => GateDecision::Allow,
    }
}

/// AccessGate
///
/// Wraps one mounted protected page. It remembers the last decision so the caller performs
/// navigation side effects once per transition, not once per re-render.
#[derive(Debug, Default)]
pub struct AccessGate {
    last: Option<GateDecision>,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// observe
    ///
    /// Re-evaluates the gate for `session`. Returns the decision when it differs from the
    /// previous one, `None` when nothing changed.
    pub fn observe(&mut self, session: &Session) -> Option<GateDecision> {
        let decision = evaluate(session);
        if self.last.as_ref() == Some(&decision) {
            return None;
        }
        self.last = Some(decision.clone());
        Some(decision)
    }

    /// Last decision returned by `observe`.
    pub fn current(&self) -> Option<&GateDecision> {
        self.last.as_ref()
    }

    /// settle
    ///
    /// Waits until the session leaves the loading phases and returns the resulting
    /// decision. A dropped session store counts as no identity.
    pub async fn settle(&mut self, sessions: &mut watch::Receiver<Session>) -> GateDecision {
        let decision = match sessions.wait_for(|session| !session.is_loading()).await {
            Ok(session) => evaluate(&session),
            Err(_) => GateDecision::Redirect(Navigation::replace(Route::Login)),
        };
        self.last = Some(decision.clone());
        decision
    }
}
