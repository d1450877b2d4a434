use super::{HOME_PATH, LOGIN_PATH, ResolvedRoute};
use crate::session::SessionState;

/// GuardDecision
///
/// The single action a guard takes for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

/// NavigationIntent
///
/// One transition as seen by the guard. `from` is `None` on the first
/// navigation of a navigator.
#[derive(Debug, Clone, Copy)]
pub struct NavigationIntent<'a> {
    pub to: &'a ResolvedRoute,
    pub from: Option<&'a ResolvedRoute>,
}

/// NavigationGuard
///
/// Runs before every transition. Queries the injected session provider once
/// and applies, in order:
/// 1. protected target without a session: redirect to login;
/// 2. login target with a session: redirect home;
/// 3. otherwise proceed.
///
/// A provider failure counts as "no session".
#[derive(Clone)]
pub struct NavigationGuard {
    sessions: SessionState,
    login_path: String,
    home_path: String,
}

impl NavigationGuard {
    pub fn new(sessions: SessionState) -> Self {
        Self {
            sessions,
            login_path: LOGIN_PATH.to_string(),
            home_path: HOME_PATH.to_string(),
        }
    }

    /// Override the redirect targets. `login` is also the pattern that marks
    /// the login route.
    pub fn with_paths(mut self, login: impl Into<String>, home: impl Into<String>) -> Self {
        self.login_path = login.into();
        self.home_path = home.into();
        self
    }

    pub async fn check(&self, intent: NavigationIntent<'_>) -> GuardDecision {
        let has_session = match self.sessions.current_session().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, to = %intent.to.full_path, "session lookup failed; treating as signed out");
                false
            }
        };

        let decision = self.decide(intent.to, has_session);
        tracing::debug!(
            to = %intent.to.full_path,
            from = intent.from.map(|r| r.full_path.as_str()).unwrap_or("-"),
            has_session,
            ?decision,
            "navigation guard"
        );
        decision
    }

    /// The pure decision table, given whether a session exists.
    ///
    /// The login rule checks the matched route pattern, not the raw path, so
    /// `/LOGIN` and `/login/` count as the login page.
    pub fn decide(&self, to: &ResolvedRoute, has_session: bool) -> GuardDecision {
        if to.requires_auth && !has_session {
            GuardDecision::Redirect(self.login_path.clone())
        } else if to.pattern == self.login_path && has_session {
            GuardDecision::Redirect(self.home_path.clone())
        } else {
            GuardDecision::Proceed
        }
    }
}
