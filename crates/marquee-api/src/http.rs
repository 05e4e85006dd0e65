// Shared request execution and the response-to-result mapping
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::error::{ApiError, Result};

/// Fields APIs use to explain a failure, in the order we trust them
const MESSAGE_FIELDS: [&str; 3] = ["status_message", "message", "error"];

/// Response fields that are credentials and never reach the logs
const SECRET_FIELDS: [&str; 3] = ["session_id", "guest_session_id", "request_token"];

/// Send a request and decode a JSON body.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let (status, body) = execute(request).await?;
    map_response(status, &body)
}

/// Send a request whose success carries no payload worth decoding (DELETE and friends).
pub async fn send_empty(request: RequestBuilder) -> Result<()> {
    let (status, body) = execute(request).await?;
    map_empty(status, &body)
}

async fn execute(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>)> {
    let (client, request) = request.build_split();
    let request = request.map_err(ApiError::from_transport)?;

    // Only the path is logged - query strings carry api keys and session ids
    let method = request.method().clone();
    let path = request.url().path().to_string();
    let started = Instant::now();

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            let err = ApiError::from_transport(e);
            warn!("{} {} failed after {:?}: {}", method, path, started.elapsed(), err);
            return Err(err);
        }
    };

    let status = response.status();
    let body = response.bytes().await.map_err(ApiError::from_transport)?;

    debug!(
        "{} {} -> {} ({} bytes, {:?})",
        method,
        path,
        status.as_u16(),
        body.len(),
        started.elapsed()
    );
    trace!("response body: {}", redacted_body(&body));

    Ok((status, body.to_vec()))
}

/// The mapping rule every repository relies on:
///
/// - 2xx with a body -> decoded value
/// - 2xx with an empty or `null` body -> [`ApiError::EmptyBody`]
/// - anything else -> [`ApiError::Server`] with the status and the server's own message
pub fn map_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        return Err(server_error(status, body));
    }

    if is_null_body(body) {
        return Err(ApiError::EmptyBody);
    }

    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like [`map_response`] but any 2xx counts, body or not.
pub fn map_empty(status: StatusCode, body: &[u8]) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(server_error(status, body))
    }
}

/// The body as text with every secret field masked. Bodies that are not
/// JSON are not logged at all.
fn redacted_body(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(mut value) => {
            redact(&mut value);
            value.to_string()
        }
        Err(_) => format!("<{} bytes, not JSON>", body.len()),
    }
}

fn redact(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SECRET_FIELDS.contains(&key.as_str()) {
                    *field = serde_json::Value::String("[redacted]".to_string());
                } else {
                    redact(field);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn is_null_body(body: &[u8]) -> bool {
    let trimmed = String::from_utf8_lossy(body);
    let trimmed = trimmed.trim();
    trimmed.is_empty() || trimmed == "null"
}

fn server_error(status: StatusCode, body: &[u8]) -> ApiError {
    let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
    let message = server_message(body).unwrap_or_else(|| reason.clone());

    ApiError::Server {
        status_code: status.as_u16(),
        status: reason,
        message,
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    MESSAGE_FIELDS.iter().find_map(|field| {
        value
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
