//! Ibercheck REST API client library.
//!
//! Provides authenticated JSON and upload calls ([`request`]), a typed
//! error taxonomy for transport failures and Problem Documents
//! ([`error`], [`problem`], [`transport`]), the one-shot online signature
//! listener ([`signature`]) and HAL link helpers ([`hal`]).

pub mod config;
pub mod error;
pub mod hal;
pub mod problem;
pub mod request;
pub mod signature;
pub mod transport;

pub use error::{ApiLogicError, IbercheckError, Result, ValidationError, ValidationMessages};
pub use request::{ApiRequest, UploadFile};
pub use signature::AuthorizationOnlineSignature;
