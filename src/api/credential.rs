//! PAT-based credential for Azure DevOps.
//!
//! Azure DevOps accepts a personal access token as the password half of HTTP
//! basic auth with an empty user name.

use base64::Engine;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ApiError, ApiResult};

/// PAT-based credential for Azure DevOps authentication.
///
/// # Example
///
/// ```rust
/// use ado_rest::api::PatCredential;
/// use secrecy::SecretString;
///
/// let credential = PatCredential::new(SecretString::from("your-pat-token".to_string()));
/// assert!(format!("{credential:?}").contains("[REDACTED]"));
/// ```
#[derive(Clone)]
pub struct PatCredential {
    pat: SecretString,
}

impl PatCredential {
    /// Creates a new PAT credential from a SecretString.
    pub fn new(pat: SecretString) -> Self {
        Self { pat }
    }

    /// Builds the `Authorization` header value: `Basic base64(":" + pat)`.
    ///
    /// The value is marked sensitive so it is skipped by header debug output.
    pub fn authorization_header(&self) -> ApiResult<HeaderValue> {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!(":{}", self.pat.expose_secret()));
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|e| {
            ApiError::InvalidParameter {
                name: "Authorization".to_string(),
                message: e.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for PatCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatCredential")
            .field("pat", &"[REDACTED]")
            .finish()
    }
}
