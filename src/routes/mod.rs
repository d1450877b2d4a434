//! HTTP routes of the portal service. The JSON API lives in `public`; page
//! loads fall through to the gated `handlers::serve_page` fallback registered
//! in `create_router`.

/// JSON API used by the front end.
pub mod public;
