//! Authenticated calls against the Ibercheck REST API.
//!
//! Every call sends `Authorization: Bearer <token>`. JSON calls also send
//! the vendor media type [`CONTENT_TYPE`]; uploads send a multipart form
//! and leave the content type (with its boundary) to the HTTP client.
//!
//! A call resolves with the parsed JSON body, or fails with exactly one
//! [`IbercheckError`]. A 2xx body that is a Problem Document still fails.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE as CONTENT_TYPE_HEADER};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;
use crate::error::IbercheckError;
use crate::problem::test_for_logical_error;
use crate::transport::{FailureCategory, TransportFailure, map_transport_failure};

/// Media type of API v1 requests.
pub const CONTENT_TYPE: &str = "application/vnd.ibercheck.v1+json";

/// Multipart field the API reads uploads from.
const UPLOAD_FIELD: &str = "file";

/// Settings shared by every request issued through one [`ApiRequest`].
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub content_type: String,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            content_type: CONTENT_TYPE.to_string(),
            timeout: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A file to send through [`ApiRequest::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, naming the part after the file.
    ///
    /// # Errors
    ///
    /// Returns [`IbercheckError::Io`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UPLOAD_FIELD.to_string());

        Ok(Self::from_bytes(file_name, bytes))
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Issues requests against the API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    http: reqwest::Client,
    defaults: RequestDefaults,
}

impl ApiRequest {
    /// Creates a client with [`RequestDefaults::default`].
    ///
    /// # Errors
    ///
    /// Returns [`IbercheckError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_defaults(RequestDefaults::default())
    }

    /// Creates a client with custom defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IbercheckError::Http`] if the HTTP client cannot be built.
    pub fn with_defaults(defaults: RequestDefaults) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(&defaults.user_agent);
        if let Some(timeout) = defaults.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, defaults })
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Gets data from the API.
    ///
    /// # Errors
    ///
    /// Fails with the classified [`IbercheckError`] for the call.
    pub async fn get(&self, access_token: &str, endpoint: &str) -> Result<Value> {
        let url = parse_endpoint(endpoint)?;
        let request = self
            .http
            .get(url)
            .header(CONTENT_TYPE_HEADER, &self.defaults.content_type);

        self.execute("GET", request, access_token).await
    }

    /// Sends `data` as a JSON body.
    ///
    /// # Errors
    ///
    /// Fails with [`IbercheckError::Json`] if `data` cannot be serialized,
    /// otherwise with the classified error for the call.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        access_token: &str,
        endpoint: &str,
        data: &T,
    ) -> Result<Value> {
        let url = parse_endpoint(endpoint)?;
        let request = self.json_body(self.http.post(url), data)?;

        self.execute("POST", request, access_token).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Same as [`ApiRequest::post`].
    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        access_token: &str,
        endpoint: &str,
        data: &T,
    ) -> Result<Value> {
        let url = parse_endpoint(endpoint)?;
        let request = self.json_body(self.http.patch(url), data)?;

        self.execute("PATCH", request, access_token).await
    }

    /// Uploads a file as the `file` part of a multipart POST.
    ///
    /// # Errors
    ///
    /// Fails with [`IbercheckError::Http`] for an invalid MIME type,
    /// otherwise with the classified error for the call.
    pub async fn upload(
        &self,
        access_token: &str,
        endpoint: &str,
        file: UploadFile,
    ) -> Result<Value> {
        let url = parse_endpoint(endpoint)?;
        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime.as_deref() {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);
        debug!(size, "prepared upload");

        self.execute("POST", self.http.post(url).multipart(form), access_token)
            .await
    }

    fn json_body<T: Serialize + ?Sized>(
        &self,
        request: RequestBuilder,
        data: &T,
    ) -> Result<RequestBuilder> {
        let body = serde_json::to_vec(data)?;
        Ok(request
            .header(CONTENT_TYPE_HEADER, &self.defaults.content_type)
            .body(body))
    }

    /// Sends one request and turns its outcome into a body or an error.
    ///
    /// A request that cannot be built (say, a token with a newline) never
    /// leaves the process and fails with [`IbercheckError::Http`].
    async fn execute(
        &self,
        method: &'static str,
        request: RequestBuilder,
        access_token: &str,
    ) -> Result<Value> {
        let request = request
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json");
        debug!(method, "sending request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                warn!(method, error = %e, "request could not be built");
                return Err(IbercheckError::Http(e));
            }
            Err(e) => {
                warn!(method, error = %e, "request failed before a response");
                return Err(map_transport_failure(&send_failure(&e)));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(method, status = status.as_u16(), error = %e, "failed to read response body");
                let failure = TransportFailure {
                    status: status.as_u16(),
                    category: Some(body_failure_category(&e)),
                    body: None,
                };
                return Err(map_transport_failure(&failure));
            }
        };

        if !status.is_success() {
            warn!(method, status = status.as_u16(), "request rejected");
            let failure = TransportFailure::with_status(status.as_u16(), Some(text));
            return Err(map_transport_failure(&failure));
        }

        if text.trim().is_empty() {
            debug!(method, status = status.as_u16(), "empty response body");
            return Ok(Value::Null);
        }

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                warn!(method, status = status.as_u16(), error = %e, "malformed response body");
                let failure = TransportFailure {
                    status: status.as_u16(),
                    category: Some(FailureCategory::ParseError),
                    body: Some(text),
                };
                return Err(map_transport_failure(&failure));
            }
        };

        test_for_logical_error(&body)?;
        debug!(method, status = status.as_u16(), "request succeeded");

        Ok(body)
    }
}

/// Describes a request that never produced a response.
fn send_failure(error: &reqwest::Error) -> TransportFailure {
    let category = error.is_timeout().then_some(FailureCategory::Timeout);
    TransportFailure::no_response(category)
}

fn body_failure_category(error: &reqwest::Error) -> FailureCategory {
    if error.is_timeout() {
        FailureCategory::Timeout
    } else if error.is_decode() {
        FailureCategory::ParseError
    } else {
        FailureCategory::Abort
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| IbercheckError::InvalidUrl(format!("{endpoint}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(IbercheckError::InvalidUrl(format!(
            "{endpoint}: unsupported scheme {other}"
        ))),
    }
}
