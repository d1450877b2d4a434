use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::RwLock;

use super::{GuardDecision, NavigationGuard, NavigationIntent, ResolvedRoute, RouteTable, ViewRegistry};
use crate::{error::NavigationError, session::SessionState};

/// Guard redirects followed before a navigation is declared a loop.
pub const MAX_REDIRECTS: usize = 10;

/// CompletedNavigation
#[derive(Debug, Clone)]
pub struct CompletedNavigation<V> {
    pub route: ResolvedRoute,
    pub view: V,
    /// The location originally requested, when the guard redirected.
    pub redirected_from: Option<String>,
}

/// NavigationResult
#[derive(Debug, Clone)]
pub enum NavigationResult<V> {
    /// The guard let the (possibly redirected) navigation through and the
    /// new route is now current.
    Completed(CompletedNavigation<V>),
    /// The target, or the location a guard redirected it to, is already the
    /// current location. Nothing is committed.
    Duplicated(ResolvedRoute),
    /// A later navigation started before this one finished; nothing committed.
    Superseded { location: String },
}

/// Navigator
///
/// Explicitly constructed router instance. Owns the current route and shares
/// the route table and view registry with other navigators.
///
/// Each call to `navigate` takes a generation number. Only the newest
/// navigation may commit, so an older guard that resolves late cannot
/// overwrite a newer route.
pub struct Navigator<V> {
    table: Arc<RouteTable>,
    views: Arc<ViewRegistry<V>>,
    guard: NavigationGuard,
    current: RwLock<Option<ResolvedRoute>>,
    generation: AtomicU64,
}

impl<V> Navigator<V> {
    pub fn new(table: Arc<RouteTable>, views: Arc<ViewRegistry<V>>, sessions: SessionState) -> Self {
        Self::with_guard(table, views, NavigationGuard::new(sessions))
    }

    pub fn with_guard(table: Arc<RouteTable>, views: Arc<ViewRegistry<V>>, guard: NavigationGuard) -> Self {
        Self {
            table,
            views,
            guard,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Seed the current route without running guards, e.g. with the page the
    /// client reports it is leaving.
    pub fn starting_at(self, location: &str) -> Self {
        let route = self.table.resolve(location);
        Self {
            current: RwLock::new(Some(route)),
            ..self
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn resolve(&self, location: &str) -> ResolvedRoute {
        self.table.resolve(location)
    }

    pub async fn current(&self) -> Option<ResolvedRoute> {
        self.current.read().await.clone()
    }

    pub async fn navigate(&self, location: &str) -> Result<NavigationResult<V>, NavigationError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let from = self.current().await;

        let mut target = self.table.resolve(location);
        if from.as_ref().is_some_and(|f| f.full_path == target.full_path) {
            tracing::debug!(location = %target.full_path, "navigation duplicated");
            return Ok(NavigationResult::Duplicated(target));
        }

        let mut redirected_from = None;
        let mut hops = 0;

        loop {
            let intent = NavigationIntent {
                to: &target,
                from: from.as_ref(),
            };
            let decision = self.guard.check(intent).await;
            match decision {
                GuardDecision::Proceed => break,
                GuardDecision::Redirect(next) => {
                    hops += 1;
                    if hops > MAX_REDIRECTS {
                        return Err(NavigationError::RedirectLoop {
                            location: location.to_string(),
                            hops: MAX_REDIRECTS,
                        });
                    }
                    redirected_from.get_or_insert_with(|| target.full_path.clone());
                    target = self.table.resolve(&next);
                    if from.as_ref().is_some_and(|f| f.full_path == target.full_path) {
                        tracing::debug!(location, redirect = %target.full_path, "redirect to current route");
                        return Ok(NavigationResult::Duplicated(target));
                    }
                }
            }

            if self.is_stale(ticket) {
                return Ok(NavigationResult::Superseded {
                    location: location.to_string(),
                });
            }
        }

        let view = self.views.load(target.component, &target.view_props())?;

        let mut current = self.current.write().await;
        if self.is_stale(ticket) {
            tracing::debug!(location, "navigation superseded before commit");
            return Ok(NavigationResult::Superseded {
                location: location.to_string(),
            });
        }
        *current = Some(target.clone());
        drop(current);

        tracing::info!(
            to = %target.full_path,
            route = %target.name,
            redirected_from = redirected_from.as_deref().unwrap_or("-"),
            "navigation completed"
        );

        Ok(NavigationResult::Completed(CompletedNavigation {
            route: target,
            view,
            redirected_from,
        }))
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}
