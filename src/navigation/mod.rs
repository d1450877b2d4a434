//! Client-side navigation: route table, path matching, view lookup, the
//! session guard and the navigator that ties them together.

pub mod guard;
pub mod navigator;
pub mod pattern;
pub mod table;
pub mod views;

pub use guard::{GuardDecision, NavigationGuard, NavigationIntent};
pub use navigator::{CompletedNavigation, MAX_REDIRECTS, NavigationResult, Navigator};
pub use pattern::{PathPattern, RouteParams};
pub use table::{
    HOME_PATH, LOGIN_PATH, Location, ResolvedRoute, RouteEntry, RouteMeta, RouteRecord,
    RouteTable, portal_routes,
};
pub use views::{ViewDescriptor, ViewFactory, ViewId, ViewRegistry};
