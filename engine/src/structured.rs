//! Structured-output plumbing around the generative backend.
//!
//! Models are asked for JSON but reply with prose, code fences, or both.
//! This module extracts the payload, parses it into a typed value, and
//! re-prompts once when the first reply cannot be parsed. A separate
//! wrapper adds the per-call timeout and single backoff retry the
//! pipeline applies to every external call.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::backend::{CompletionRequest, GenerativeBackend};
use crate::error::BackendError;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.+?)\s*```").unwrap());

/// Pull the JSON payload out of a model reply.
///
/// Prefers a fenced block; otherwise takes the widest `{...}` or `[...]`
/// span so leading or trailing prose does not break parsing.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(captures) = FENCED_JSON.captures(text) {
        if let Some(payload) = captures.get(1) {
            return Some(payload.as_str());
        }
    }

    let object = widest_span(text, '{', '}');
    let array = widest_span(text, '[', ']');
    match (object, array) {
        (Some(o), Some(a)) => {
            if text.find('{') < text.find('[') {
                Some(o)
            } else {
                Some(a)
            }
        }
        (Some(o), None) => Some(o),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

fn widest_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let payload = extract_json(raw).ok_or_else(|| "no JSON found in response".to_string())?;
    serde_json::from_str(payload).map_err(|e| e.to_string())
}

/// Parse a typed value out of one completion, re-prompting once when the
/// first reply is malformed. A second malformed reply is a parse error.
pub async fn complete_structured<T: DeserializeOwned>(
    backend: &dyn GenerativeBackend,
    request: &CompletionRequest,
) -> Result<T, BackendError> {
    let raw = backend.complete(request).await?;
    match parse_payload::<T>(&raw) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            let retry = CompletionRequest {
                system: request.system.clone(),
                user: format!(
                    "{}\n\nYour previous reply could not be parsed ({first_error}). \
                     Respond again with ONLY the JSON value, no prose and no code fences.",
                    request.user
                ),
                max_tokens: request.max_tokens,
            };
            let raw = backend.complete(&retry).await?;
            parse_payload::<T>(&raw).map_err(BackendError::Parse)
        }
    }
}

/// Run a structured completion under a timeout, retrying the whole call
/// once after a backoff pause. Covers transient network failures and
/// timeouts; the second failure propagates to the caller.
pub async fn complete_structured_with_retry<T: DeserializeOwned>(
    backend: &dyn GenerativeBackend,
    request: &CompletionRequest,
    timeout: Duration,
    backoff: Duration,
) -> Result<T, BackendError> {
    match timed::<T>(backend, request, timeout).await {
        Ok(value) => Ok(value),
        Err(_) => {
            tokio::time::sleep(backoff).await;
            timed::<T>(backend, request, timeout).await
        }
    }
}

async fn timed<T: DeserializeOwned>(
    backend: &dyn GenerativeBackend,
    request: &CompletionRequest,
    timeout: Duration,
) -> Result<T, BackendError> {
    match tokio::time::timeout(timeout, complete_structured::<T>(backend, request)).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(timeout.as_millis())),
    }
}
