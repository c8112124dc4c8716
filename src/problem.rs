//! Problem Document classification.
//!
//! The API reports application errors as `application/problem+json`
//! style documents:
//!
//! ```json
//! {
//!   "status": 422,
//!   "title": "Unprocessable Entity",
//!   "detail": "Failed Validation",
//!   "validation_messages": { "email": ["invalid"], "name": { "isEmpty": "required" } }
//! }
//! ```
//!
//! [`test_for_logical_error`] decides whether a parsed body is a success
//! payload, a generic logic error, or a validation error.

use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::error::{ApiLogicError, ValidationError, ValidationMessages};

/// Fails if `body` is a Problem Document.
///
/// A truthy `validation_messages` wins and yields
/// [`IbercheckError::Validation`](crate::IbercheckError::Validation). Otherwise
/// a `detail` key, even an empty or null one, yields
/// [`IbercheckError::ApiLogic`](crate::IbercheckError::ApiLogic). Anything else,
/// including non-object bodies, is a success payload.
///
/// # Errors
///
/// Returns the classified error when the body carries an error shape.
pub fn test_for_logical_error(body: &Value) -> Result<()> {
    let Some(object) = body.as_object() else {
        return Ok(());
    };

    if let Some(validation) = object.get("validation_messages").filter(|v| is_truthy(v)) {
        let messages = first_messages(validation);
        debug!(fields = messages.len(), "response is a validation error");
        return Err(ValidationError::new(logic_fields(body), messages).into());
    }

    if object.contains_key("detail") {
        let error = logic_fields(body);
        debug!(code = ?error.code, "response is an api logic error");
        return Err(error.into());
    }

    Ok(())
}

/// Picks one message per field: the first array element, or the value of
/// the first key of a nested object. Other shapes are skipped.
fn first_messages(validation: &Value) -> ValidationMessages {
    let Some(fields) = validation.as_object() else {
        return ValidationMessages::default();
    };

    fields
        .iter()
        .filter_map(|(field, messages)| {
            let first = match messages {
                Value::Array(list) => list.first(),
                Value::Object(map) => map.values().next(),
                _ => None,
            };
            first
                .and_then(Value::as_str)
                .map(|message| (field.clone(), message.to_string()))
        })
        .collect()
}

fn logic_fields(body: &Value) -> ApiLogicError {
    let code = body
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());
    let name = body.get("title").and_then(Value::as_str).map(String::from);
    let message = match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    ApiLogicError::new(code, name, message)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
