//! Crate-level error types.
//!
//! [`IbercheckError`] is the closed taxonomy every public call fails with:
//! transport absence (`Network`, `NetworkTimeout`), transport status
//! (`NotFound`, `Server`), malformed bodies, aborted or unknown failures,
//! and the application-level Problem Documents (`ApiLogic`, `Validation`).
//! Callers switch on [`IbercheckError::name`] or match the variant directly.

use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IbercheckError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum IbercheckError {
    /// No response at all (connection refused, reset before a status line).
    #[error("network error: {message}")]
    Network { message: String },

    /// The transport gave up waiting. A specialization of [`Self::Network`].
    #[error("network timeout: {message}")]
    NetworkTimeout { message: String },

    /// The server answered 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server answered 500.
    #[error("server error: {message}")]
    Server { message: String },

    /// The response body was not valid JSON.
    #[error("syntax error: {0}")]
    Parse(String),

    #[error("Aborted.")]
    Aborted,

    /// A failure matched no known rule and carried no body.
    #[error("Unknown")]
    Unknown,

    /// The API returned a Problem Document with a `detail`.
    #[error(transparent)]
    ApiLogic(#[from] ApiLogicError),

    /// The API rejected the input with per-field validation messages.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A failure body that parsed as JSON but carried no error shape.
    /// Holds the raw body text verbatim.
    #[error("{0}")]
    Unexpected(String),

    /// The message channel ended before a trusted message arrived.
    #[error("message channel closed before a result was received")]
    ChannelClosed,

    /// A HAL relation was requested that the model does not link.
    #[error("There is no link with the desired relational. Use hasLink() to test this")]
    MissingLink(String),

    /// Request data could not be serialized to JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An endpoint that is not an absolute http(s) URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Reading a file for upload failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP client or a request could not be built, e.g. a token that
    /// is not a valid header value. Nothing was sent.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IbercheckError {
    /// Returns the taxonomy tag callers switch on.
    ///
    /// Problem Document errors report the document's `title`, falling back
    /// to the variant name when the server sent none.
    pub fn name(&self) -> &str {
        match self {
            Self::Network { .. } => "NetworkError",
            Self::NetworkTimeout { .. } => "NetworkTimeoutError",
            Self::NotFound { .. } => "NotFoundError",
            Self::Server { .. } => "ServerError",
            Self::Parse(_) => "SyntaxError",
            Self::ApiLogic(e) => e.name.as_deref().unwrap_or("ApiLogicError"),
            Self::Validation(e) => e.logic.name.as_deref().unwrap_or("ValidationError"),
            Self::ChannelClosed => "ChannelClosed",
            Self::Aborted
            | Self::Unknown
            | Self::Unexpected(_)
            | Self::MissingLink(_)
            | Self::Json(_)
            | Self::InvalidUrl(_)
            | Self::Io(_)
            | Self::Config(_)
            | Self::Http(_) => "Error",
        }
    }

    /// Returns the human-readable message.
    ///
    /// For Problem Document errors this is the document's `detail`.
    pub fn message(&self) -> String {
        match self {
            Self::Network { message }
            | Self::NetworkTimeout { message }
            | Self::NotFound { message }
            | Self::Server { message } => message.clone(),
            Self::ApiLogic(e) => e.message.clone(),
            Self::Validation(e) => e.logic.message.clone(),
            Self::Unexpected(body) => body.clone(),
            other => other.to_string(),
        }
    }

    /// `true` for [`Self::Network`] and its [`Self::NetworkTimeout`] specialization.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::NetworkTimeout { .. })
    }

    /// Returns the Problem Document fields shared by `ApiLogic` and `Validation`.
    pub fn as_logic(&self) -> Option<&ApiLogicError> {
        match self {
            Self::ApiLogic(e) => Some(e),
            Self::Validation(e) => Some(e.as_logic()),
            _ => None,
        }
    }

    /// Problem Document `status`, if this error came from one.
    pub fn code(&self) -> Option<u16> {
        self.as_logic().and_then(|e| e.code)
    }
}

/// An application-level error reported by the API in a Problem Document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLogicError {
    /// Problem Document `status`.
    pub code: Option<u16>,
    /// Problem Document `title`.
    pub name: Option<String>,
    /// Problem Document `detail`.
    pub message: String,
}

impl ApiLogicError {
    pub fn new(code: Option<u16>, name: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiLogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.code) {
            (Some(name), Some(code)) => write!(f, "{name} ({code}): {}", self.message),
            (Some(name), None) => write!(f, "{name}: {}", self.message),
            (None, Some(code)) => write!(f, "api error ({code}): {}", self.message),
            (None, None) => write!(f, "api error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiLogicError {}

/// One representative message per rejected field, in the order the server
/// listed the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationMessages(Vec<(String, String)>);

impl ValidationMessages {
    /// Returns the message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<F: Into<String>, M: Into<String>> FromIterator<(F, M)> for ValidationMessages {
    fn from_iter<I: IntoIterator<Item = (F, M)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(f, m)| (f.into(), m.into()))
                .collect(),
        )
    }
}

/// An [`ApiLogicError`] caused by input validation, with per-field feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub logic: ApiLogicError,
    pub messages: ValidationMessages,
}

impl ValidationError {
    pub fn new(logic: ApiLogicError, messages: ValidationMessages) -> Self {
        Self { logic, messages }
    }

    pub fn as_logic(&self) -> &ApiLogicError {
        &self.logic
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.logic)?;
        for (field, message) in self.messages.iter() {
            write!(f, "; {field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
