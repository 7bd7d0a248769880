//! HTTP response building module
//!
//! Provides builders for the JSON responses the registry sends, decoupled
//! from the handlers that decide which one to send.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::{Method, Response, StatusCode};
use serde::Serialize;

use crate::error::RegistryError;

const JSON: &str = "application/json";

/// Build a JSON response from any serializable body
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_raw_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"internal server error"}"#),
            );
        }
    };

    build_raw_json(status, Bytes::from(json))
}

/// Build a 200 response with JSON content type and no body
pub fn build_empty_json_response() -> Response<Full<Bytes>> {
    build_raw_json(StatusCode::OK, Bytes::new())
}

/// Build the response reporting a request-level error
pub fn build_error_response(error: &RegistryError) -> Response<Full<Bytes>> {
    build_json_response(error.status(), &error.to_body())
}

/// Build 404 Not Found response for paths outside the route table
pub fn build_404_response(path: &str) -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "not found",
            "path": path,
            "available_endpoints": ["/movies", "/movies/{id}"],
        }),
    )
}

/// Build 405 Method Not Allowed response listing the registered methods
pub fn build_405_response(allow: &[Method]) -> Response<Full<Bytes>> {
    let allow_header = allow_header(allow);

    let mut response = build_json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({ "error": "method not allowed" }),
    );
    if let Ok(value) = HeaderValue::from_str(&allow_header) {
        response.headers_mut().insert("Allow", value);
    }
    response
}

/// Build OPTIONS response (preflight request) for a path registered under `allow`
pub fn build_options_response(allow: &[Method], enable_cors: bool) -> Response<Full<Bytes>> {
    let allow_header = allow_header(allow);
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", allow_header.as_str());

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", allow_header.as_str())
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build health check response (for liveness/readiness probes)
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    build_json_response(StatusCode::OK, &serde_json::json!({ "status": status }))
}

/// `Allow` value: the route methods, then OPTIONS, which every known path answers
fn allow_header(allow: &[Method]) -> String {
    allow
        .iter()
        .map(Method::as_str)
        .chain(std::iter::once("OPTIONS"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_raw_json(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", JSON)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
