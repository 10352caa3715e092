use thiserror::Error;

/// Errors that can occur while building a login link or handling a provider callback.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required configuration value is absent or empty.
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(&'static str),
    /// The request to the provider could not be executed, timed out, or returned a non-2xx status.
    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),
    /// The provider answered, but the body was not JSON or lacked a required field.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// The provider answered with an OAuth error object (e.g. `bad_verification_code`).
    #[error("Provider rejected the request: {error}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    ProviderRejected {
        /// The OAuth error code.
        error: String,
        /// Optional human-readable description supplied by the provider.
        description: Option<String>,
    },
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::MalformedResponse(err.to_string())
        } else {
            AuthError::RemoteCallFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::MalformedResponse(err.to_string())
    }
}
