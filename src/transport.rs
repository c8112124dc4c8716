//! Mapping of transport-level failures onto [`IbercheckError`].

use tracing::debug;

use crate::error::IbercheckError;
use crate::problem::test_for_logical_error;

/// Why the transport layer gave up, when it knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The response body could not be parsed.
    ParseError,
    Timeout,
    Abort,
}

/// What the transport layer knows about a failed call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportFailure {
    /// HTTP status, or `0` when no response was received.
    pub status: u16,
    pub category: Option<FailureCategory>,
    /// Raw response body, if any.
    pub body: Option<String>,
}

impl TransportFailure {
    /// A call that never received a status line.
    pub fn no_response(category: Option<FailureCategory>) -> Self {
        Self {
            status: 0,
            category,
            body: None,
        }
    }

    /// A call that received `status` and an optional body.
    pub fn with_status(status: u16, body: Option<String>) -> Self {
        Self {
            status,
            category: None,
            body,
        }
    }
}

/// Maps a failure to exactly one error.
///
/// Transport signals are checked before the body: no response, 404, 500,
/// then parse, timeout and abort categories. Only then is the body parsed
/// and classified as a Problem Document; a body with no error shape is
/// returned verbatim as [`IbercheckError::Unexpected`].
///
/// A timed-out request has no status line either: status 0 with the
/// Timeout category maps to [`IbercheckError::NetworkTimeout`], not
/// [`IbercheckError::Network`].
pub fn map_transport_failure(failure: &TransportFailure) -> IbercheckError {
    let error = match (failure.status, failure.category) {
        (0, category) if category != Some(FailureCategory::Timeout) => IbercheckError::Network {
            message: "no response from server".into(),
        },
        (404, _) => IbercheckError::NotFound {
            message: "resource not found".into(),
        },
        (500, _) => IbercheckError::Server {
            message: "internal server error".into(),
        },
        (_, Some(FailureCategory::ParseError)) => {
            IbercheckError::Parse("malformed response body".into())
        }
        (_, Some(FailureCategory::Timeout)) => IbercheckError::NetworkTimeout {
            message: "request timed out".into(),
        },
        (_, Some(FailureCategory::Abort)) => IbercheckError::Aborted,
        (_, None) => classify_body(failure.body.as_deref()),
    };

    debug!(status = failure.status, category = ?failure.category, kind = error.name(), "mapped transport failure");
    error
}

fn classify_body(body: Option<&str>) -> IbercheckError {
    let Some(raw) = body.filter(|b| !b.is_empty()) else {
        return IbercheckError::Unknown;
    };

    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return IbercheckError::Parse(e.to_string()),
    };

    match test_for_logical_error(&value) {
        Err(e) => e,
        Ok(()) => IbercheckError::Unexpected(raw.to_string()),
    }
}
