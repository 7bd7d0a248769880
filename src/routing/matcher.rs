//! Route matching module
//!
//! Matches a request's method and path against a route table of
//! `(method, pattern)` entries. Patterns are literal segments plus `{name}`
//! captures, each capturing exactly one non-empty segment.

use hyper::Method;

/// The operation a matched route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    ListMovies,
    GetMovie,
    CreateMovie,
    UpdateMovie,
    DeleteMovie,
}

/// One entry of the route table
#[derive(Debug)]
pub struct Route {
    pub method: Method,
    pub pattern: &'static str,
    pub kind: RouteKind,
}

/// Values captured from `{name}` segments, in pattern order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PathParams<'a> {
    params: Vec<(&'static str, &'a str)>,
}

impl<'a> PathParams<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

/// Outcome of matching a request against the route table
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Matched {
        kind: RouteKind,
        params: PathParams<'a>,
    },
    /// Path is known but registered under other methods
    MethodNotAllowed { allow: Vec<Method> },
    NotFound,
}

/// The five movie routes
pub static MOVIE_ROUTES: [Route; 5] = [
    Route {
        method: Method::GET,
        pattern: "/movies",
        kind: RouteKind::ListMovies,
    },
    Route {
        method: Method::GET,
        pattern: "/movies/{id}",
        kind: RouteKind::GetMovie,
    },
    Route {
        method: Method::POST,
        pattern: "/movies",
        kind: RouteKind::CreateMovie,
    },
    Route {
        method: Method::PUT,
        pattern: "/movies/{id}",
        kind: RouteKind::UpdateMovie,
    },
    Route {
        method: Method::DELETE,
        pattern: "/movies/{id}",
        kind: RouteKind::DeleteMovie,
    },
];

/// Find the first route whose method and pattern both match
pub fn match_route<'a>(method: &Method, path: &'a str, routes: &[Route]) -> RouteMatch<'a> {
    let mut allow = Vec::new();

    for route in routes {
        let Some(params) = match_pattern(route.pattern, path) else {
            continue;
        };
        if route.method == *method {
            return RouteMatch::Matched {
                kind: route.kind,
                params,
            };
        }
        if !allow.contains(&route.method) {
            allow.push(route.method.clone());
        }
    }

    if allow.is_empty() {
        RouteMatch::NotFound
    } else {
        RouteMatch::MethodNotAllowed { allow }
    }
}

/// Match a path against a single pattern, capturing `{name}` segments
///
/// One trailing slash on the path is ignored.
pub fn match_pattern<'a>(pattern: &'static str, path: &'a str) -> Option<PathParams<'a>> {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    let mut params = PathParams::default();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                {
                    if actual.is_empty() {
                        return None;
                    }
                    params.params.push((name, actual));
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}
