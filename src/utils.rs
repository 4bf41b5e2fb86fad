//! Small helpers shared by the JSON-RPC tool handlers.

use serde::de::DeserializeOwned;
use serde_json::{from_value, json, Value};

use crate::error::IntentError;
use crate::mcp::protocol::{error_codes, Response};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Absent or `null` is `None`; present but mistyped is an error.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<Option<T>, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => from_value(v.clone()).map(Some).map_err(|e| {
            Response::error(
                req_id.clone(),
                error_codes::INVALID_PARAMS,
                format!("Invalid argument '{}': {}", key, e),
            )
        }),
    }
}

/// Caller mistakes become `INVALID_PARAMS`, everything else
/// `INTERNAL_ERROR`; the stable code and HTTP status ride along in `data`.
pub fn intent_error_response(req_id: &Value, err: &IntentError) -> Response {
    let status = err.status();
    let code = if status.is_client_error() {
        error_codes::INVALID_PARAMS
    } else {
        error_codes::INTERNAL_ERROR
    };
    Response::error(req_id.clone(), code, err.to_string())
        .with_data(json!({ "code": err.code(), "status": status.as_u16() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_optional_args() {
        let args = json!({"text": "hi", "n": null, "bad": 3});
        let id = json!(1);
        assert_eq!(get_required_arg::<String>(&args, "text", &id).unwrap(), "hi");
        assert!(get_required_arg::<String>(&args, "missing", &id).is_err());
        assert_eq!(get_optional_arg::<String>(&args, "n", &id).unwrap(), None);
        assert!(get_optional_arg::<String>(&args, "bad", &id).is_err());
    }

    #[test]
    fn test_error_mapping() {
        let id = json!("a");
        let resp = intent_error_response(&id, &IntentError::UnknownRecipient("mom".into()));
        let err = resp.error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert_eq!(err.data.unwrap()["code"], "UNKNOWN_RECIPIENT");

        let resp = intent_error_response(&id, &IntentError::Configuration("no key".into()));
        let err = resp.error.unwrap();
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
        assert_eq!(err.data.unwrap()["status"], 500);
    }
}
