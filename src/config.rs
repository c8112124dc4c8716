//! Application configuration loaded from environment variables.
//!
//! - `IBERCHECK_API_URL` overrides the default API host.
//! - `IBERCHECK_ACCESS_TOKEN` supplies the bearer token (optional).
//! - `IBERCHECK_TIMEOUT_SECS` sets a request deadline in whole seconds.

use std::time::Duration;

use zeroize::Zeroizing;

use crate::request::RequestDefaults;

/// Default API host.
const DEFAULT_API_URL: &str = "https://api.ibercheck.net";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub ibercheck: IbercheckConfig,
}

/// Ibercheck-specific configuration values.
#[derive(Debug)]
pub struct IbercheckConfig {
    pub api_url: String,
    pub access_token: Option<Zeroizing<String>>,
    pub timeout: Option<Duration>,
}

impl IbercheckConfig {
    /// Request defaults carrying the configured timeout.
    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            timeout: self.timeout,
            ..RequestDefaults::default()
        }
    }

    /// Joins `path` onto the API host.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Loads the application configuration from environment variables.
///
/// Empty values are treated as unset.
///
/// # Errors
///
/// Returns [`IbercheckError::Config`](crate::IbercheckError::Config) if
/// `IBERCHECK_TIMEOUT_SECS` is not a positive integer.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let api_url =
        non_empty_var("IBERCHECK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let access_token = non_empty_var("IBERCHECK_ACCESS_TOKEN").map(Zeroizing::new);

    let timeout = match non_empty_var("IBERCHECK_TIMEOUT_SECS") {
        None => None,
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                return Err(crate::IbercheckError::Config(format!(
                    "IBERCHECK_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                )));
            }
        },
    };

    Ok(AppConfig {
        ibercheck: IbercheckConfig {
            api_url,
            access_token,
            timeout,
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
