//! Bot API response envelope checks.

use serde_json::Value;
use tgpoll_core::{error::TgPollError, update::Update};
use tracing::warn;

/// Whether a response is a successful envelope.
///
/// Requires an `ok` or `result` key, and `ok` must be exactly `true`.
/// A bare `result` without `ok` is therefore rejected.
pub fn is_valid(json: &Value) -> bool {
    let Some(obj) = json.as_object() else {
        return false;
    };
    if !(obj.contains_key("ok") || obj.contains_key("result")) {
        return false;
    }
    obj.get("ok") == Some(&Value::Bool(true))
}

/// Check a `getUpdates` envelope, carrying the API's error details on failure.
pub(crate) fn check(json: &Value) -> Result<(), TgPollError> {
    if is_valid(json) {
        return Ok(());
    }
    Err(TgPollError::InvalidEnvelope {
        error_code: json.get("error_code").and_then(Value::as_i64),
        description: json
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Decode the `result` array of a validated `getUpdates` envelope.
///
/// Entries that do not decode as updates (e.g. no `update_id`) are logged
/// and skipped so the rest of the batch still gets dispatched.
pub(crate) fn into_updates(mut json: Value) -> Result<Vec<Update>, TgPollError> {
    check(&json)?;
    let result = json
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| TgPollError::Decode("getUpdates response has no result".into()))?;
    let entries = match result {
        Value::Array(entries) => entries,
        other => {
            return Err(TgPollError::Decode(format!(
                "getUpdates result is not an array: {other}"
            )))
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Update>(entry.clone()) {
            Ok(update) => Some(update),
            Err(e) => {
                warn!("telegram: skipping undecodable update {entry}: {e}");
                None
            }
        })
        .collect())
}

/// Unwrap a command response: `result` when present, else the whole body.
pub(crate) fn into_result(mut json: Value) -> Result<Value, TgPollError> {
    if json.get("ok") != Some(&Value::Bool(true)) {
        return Err(TgPollError::Api { body: json });
    }
    match json.as_object_mut().and_then(|obj| obj.remove("result")) {
        Some(result) => Ok(result),
        None => Ok(json),
    }
}
