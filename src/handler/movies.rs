//! Movie handlers
//!
//! One function per route. Each runs against the store owned by `AppState`
//! and produces the JSON response, or a `RegistryError` the dispatcher turns
//! into a status code. With `http.legacy_silent_errors` set, unknown ids on
//! get/update answer 200 with an empty body and bodies are decoded
//! best-effort, leaving bad fields empty.

use std::error::Error as StdError;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde_json::{Map, Value};

use crate::config::AppState;
use crate::error::{RegistryError, Result};
use crate::http;
use crate::logger;
use crate::model::{Director, MovieInput};

/// GET /movies
pub async fn list_movies(state: &AppState) -> Result<Response<Full<Bytes>>> {
    let movies = state.store.list().await;
    Ok(http::build_json_response(StatusCode::OK, &movies))
}

/// GET /movies/{id}
pub async fn get_movie(state: &AppState, id: &str) -> Result<Response<Full<Bytes>>> {
    let found = state.store.get(id).await;
    silence_not_found(state, found.map(|movie| http::build_json_response(StatusCode::OK, &movie)))
}

/// POST /movies
pub async fn create_movie<B>(state: &AppState, body: B) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let input = read_input(state, body).await?;
    let movie = state.store.create(input).await;
    tracing::debug!(id = %movie.id, "Movie created");
    Ok(http::build_json_response(StatusCode::OK, &movie))
}

/// PUT /movies/{id}
///
/// The body is decoded before the store is touched, so a bad body never
/// removes the existing record.
pub async fn update_movie<B>(state: &AppState, id: &str, body: B) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let input = read_input(state, body).await?;
    let updated = state.store.update(id, input).await;
    silence_not_found(
        state,
        updated.map(|movie| http::build_json_response(StatusCode::OK, &movie)),
    )
}

/// DELETE /movies/{id}
pub async fn delete_movie(state: &AppState, id: &str) -> Result<Response<Full<Bytes>>> {
    let remaining = state.store.delete(id).await;
    Ok(http::build_json_response(StatusCode::OK, &remaining))
}

fn silence_not_found(
    state: &AppState,
    result: Result<Response<Full<Bytes>>>,
) -> Result<Response<Full<Bytes>>> {
    match result {
        Err(RegistryError::NotFound(_)) if state.config.http.legacy_silent_errors => {
            Ok(http::build_empty_json_response())
        }
        other => other,
    }
}

async fn read_input<B>(state: &AppState, body: B) -> Result<MovieInput>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let bytes = read_body(body, state.config.http.max_body_size).await?;
    decode_input(&bytes, state.config.http.legacy_silent_errors)
}

/// Collect the request body, failing once it grows past `limit` bytes
pub async fn read_body<B>(body: B, limit: u64) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(RegistryError::PayloadTooLarge { limit })
        }
        Err(e) => Err(RegistryError::Decode(format!("failed to read body: {e}"))),
    }
}

/// Decode a movie body
///
/// Strict mode requires a single JSON object whose fields have the right
/// types. Legacy mode decodes field by field: a missing, null or mistyped
/// field stays empty while the well-typed ones are kept.
pub fn decode_input(bytes: &[u8], legacy: bool) -> Result<MovieInput> {
    if legacy {
        return Ok(decode_lenient(bytes));
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => serde_json::from_value(Value::Object(fields))
            .map_err(|e| RegistryError::Decode(e.to_string())),
        Ok(other) => Err(RegistryError::Decode(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(RegistryError::Decode(e.to_string())),
    }
}

/// Only the first JSON value in the body is read; anything after it is ignored
fn decode_lenient(bytes: &[u8]) -> MovieInput {
    let value = match serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Value>()
        .next()
    {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            logger::log_warning(&format!("Ignoring undecodable movie body: {e}"));
            return MovieInput::default();
        }
        None => return MovieInput::default(),
    };

    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            logger::log_warning(&format!(
                "Ignoring movie body: expected a JSON object, found {}",
                json_kind(&other)
            ));
            return MovieInput::default();
        }
    };

    MovieInput {
        isbn: lenient_string(&fields, "isbn"),
        title: lenient_string(&fields, "title"),
        director: match lenient_field(&fields, "director") {
            Some(Value::Object(director)) => Some(Director {
                firstname: lenient_string(director, "firstname"),
                lastname: lenient_string(director, "lastname"),
            }),
            Some(Value::Null) | None => None,
            Some(other) => {
                logger::log_warning(&format!(
                    "Ignoring movie field director: expected an object, found {}",
                    json_kind(other)
                ));
                None
            }
        },
    }
}

/// Exact key first, then the first key equal ignoring ASCII case
fn lenient_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn lenient_string(fields: &Map<String, Value>, name: &str) -> String {
    match lenient_field(fields, name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            logger::log_warning(&format!(
                "Ignoring movie field {name}: expected a string, found {}",
                json_kind(other)
            ));
            String::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_input_strict() {
        let input = decode_input(br#"{"isbn":"1","title":"T"}"#, false).unwrap();
        assert_eq!(input.title, "T");
        assert_eq!(input.director, None);

        assert!(matches!(
            decode_input(b"{not json", false),
            Err(RegistryError::Decode(_))
        ));
        assert!(matches!(
            decode_input(b"", false),
            Err(RegistryError::Decode(_))
        ));
        assert!(matches!(
            decode_input(br#"{"title":5}"#, false),
            Err(RegistryError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_input_strict_requires_object() {
        let bodies: [&[u8]; 5] = [
            b"[]",
            br#"["111","Heat",{"firstname":"Michael","lastname":"Mann"}]"#,
            b"null",
            br#""Heat""#,
            b"7",
        ];
        for body in bodies {
            assert!(
                matches!(decode_input(body, false), Err(RegistryError::Decode(_))),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
        assert!(matches!(
            decode_input(br#"{"title":"a"} trailing"#, false),
            Err(RegistryError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_input_legacy() {
        assert_eq!(
            decode_input(b"{not json", true).unwrap(),
            MovieInput::default()
        );
        assert_eq!(decode_input(b"[]", true).unwrap(), MovieInput::default());
        assert_eq!(decode_input(b"", true).unwrap(), MovieInput::default());

        let input = decode_input(
            br#"{"director":{"firstname":"Agnes","lastname":"Varda"}}"#,
            true,
        )
        .unwrap();
        assert_eq!(input.director, Some(Director::new("Agnes", "Varda")));
    }

    #[test]
    fn test_decode_input_legacy_keeps_well_typed_fields() {
        let input = decode_input(br#"{"isbn":"123","title":5}"#, true).unwrap();
        assert_eq!(input.isbn, "123");
        assert_eq!(input.title, "");

        let input = decode_input(br#"{"isbn":null,"title":"Keep"}"#, true).unwrap();
        assert_eq!(input.isbn, "");
        assert_eq!(input.title, "Keep");

        let input = decode_input(
            br#"{"Title":"Cleo","director":{"firstname":7,"lastname":"Varda"}}"#,
            true,
        )
        .unwrap();
        assert_eq!(input.title, "Cleo");
        assert_eq!(input.director, Some(Director::new("", "Varda")));

        let input = decode_input(br#"{"isbn":"9","director":"nobody"}"#, true).unwrap();
        assert_eq!(input.isbn, "9");
        assert_eq!(input.director, None);

        let input = decode_input(br#"{"title":"First"} {"title":"Second"}"#, true).unwrap();
        assert_eq!(input.title, "First");
    }

    #[tokio::test]
    async fn test_read_body_limit() {
        let body = Full::new(Bytes::from_static(b"0123456789"));
        assert!(matches!(
            read_body(body, 4).await,
            Err(RegistryError::PayloadTooLarge { limit: 4 })
        ));

        let body = Full::new(Bytes::from_static(b"0123"));
        assert_eq!(read_body(body, 4).await.unwrap(), Bytes::from_static(b"0123"));
    }
}
