//! Routing module
//!
//! Maps `(method, path)` pairs onto movie operations and extracts
//! path parameters such as `{id}`.

mod matcher;

pub use matcher::{match_route, RouteKind, RouteMatch, MOVIE_ROUTES};
