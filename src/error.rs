use thiserror::Error;

use crate::navigation::ViewId;

/// RouteTableError
///
/// Raised while compiling a route table. A table that fails validation is never
/// handed to a navigator, so matching itself has no failure mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("route name `{0}` is registered more than once")]
    DuplicateName(String),

    #[error("route `{name}` ({pattern}) collides with route `{existing}`")]
    AmbiguousPath {
        name: String,
        pattern: String,
        existing: String,
    },

    #[error("catch-all route `{0}` must be the last route in the table")]
    CatchAllNotLast(String),

    #[error("catch-all route `{0}` must be a single optional wildcard segment such as `/:pathMatch(.*)*`")]
    CatchAllNotTotal(String),

    #[error("route table has no catch-all route")]
    MissingCatchAll,
}

/// ViewLoadError
///
/// A view reference could not be turned into a renderable unit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewLoadError {
    #[error("no factory registered for view `{}`", .0.as_str())]
    Unregistered(ViewId),

    #[error("view `{}` failed to load: {reason}", .view.as_str())]
    Failed { view: ViewId, reason: String },
}

/// NavigationError
///
/// Hard failures of a navigation attempt. Guard redirects and superseded
/// navigations are ordinary outcomes, not errors.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("navigation to `{location}` exceeded {hops} redirects")]
    RedirectLoop { location: String, hops: usize },

    #[error(transparent)]
    ViewLoad(#[from] ViewLoadError),
}

/// SessionError
///
/// The auth provider could not answer. The guard treats every variant as an
/// absent session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("auth provider unreachable: {0}")]
    Transport(String),

    #[error("auth provider returned status {status}")]
    Provider { status: u16 },

    #[error("malformed auth provider response: {0}")]
    Decode(String),
}

/// ConfigError
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("invalid value `{value}` for {var}")]
    Invalid { var: &'static str, value: String },
}
