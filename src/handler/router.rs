//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: pre-checks, route matching,
//! dispatch to the movie handlers, error mapping and access logging.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};

use super::movies;
use crate::config::AppState;
use crate::error::{RegistryError, Result};
use crate::http;
use crate::logger::{self, AccessLogEntry, LogFormat};
use crate::routing::{self, RouteKind, RouteMatch};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&parts, remote_addr));

    let mut response = match route_request(&parts, body, &state).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(method = %parts.method, path = parts.uri.path(), "Request failed: {e}");
            http::build_error_response(&e)
        }
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        let format = LogFormat::parse(&state.config.logging.access_log_format);
        logger::log_access(&entry, &format);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(
    parts: &Parts,
    body: B,
    state: &AppState,
) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let path = parts.uri.path();

    // 1. Preflight; no route is registered for OPTIONS, so a known path
    // reports its methods as not allowed
    if parts.method == Method::OPTIONS {
        return Ok(
            match routing::match_route(&Method::OPTIONS, path, &routing::MOVIE_ROUTES) {
                RouteMatch::MethodNotAllowed { allow } => {
                    http::build_options_response(&allow, state.config.http.enable_cors)
                }
                _ => http::build_404_response(path),
            },
        );
    }

    // 2. Health check endpoints
    let health = &state.config.routes.health;
    if health.enabled
        && parts.method == Method::GET
        && (path == health.liveness_path || path == health.readiness_path)
    {
        return Ok(http::build_health_response("ok"));
    }

    // 3. Body size
    check_body_size(parts, state.config.http.max_body_size)?;

    // 4. Route table
    match routing::match_route(&parts.method, path, &routing::MOVIE_ROUTES) {
        RouteMatch::Matched { kind, params } => {
            let id = params.get("id").unwrap_or_default();
            match kind {
                RouteKind::ListMovies => movies::list_movies(state).await,
                RouteKind::GetMovie => movies::get_movie(state, id).await,
                RouteKind::CreateMovie => movies::create_movie(state, body).await,
                RouteKind::UpdateMovie => movies::update_movie(state, id, body).await,
                RouteKind::DeleteMovie => movies::delete_movie(state, id).await,
            }
        }
        RouteMatch::MethodNotAllowed { allow } => {
            logger::log_warning(&format!("Method not allowed: {} {path}", parts.method));
            Ok(http::build_405_response(&allow))
        }
        RouteMatch::NotFound => Ok(http::build_404_response(path)),
    }
}

/// Reject requests whose declared Content-Length exceeds the limit
fn check_body_size(parts: &Parts, max_body_size: u64) -> Result<()> {
    let Some(content_length) = parts.headers.get("content-length") else {
        return Ok(());
    };

    match content_length.to_str().map(str::parse::<u64>) {
        Ok(Ok(size)) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(RegistryError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Ok(Ok(_)) => Ok(()),
        // Malformed values are left to the streaming limit
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            Ok(())
        }
    }
}

fn access_entry(parts: &Parts, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
