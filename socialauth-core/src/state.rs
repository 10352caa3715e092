use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-request overrides for the login link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Overrides the configured scope list.
    #[serde(default)]
    pub scope: Option<String>,
    /// Overrides the configured callback URL.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Opaque value the provider hands back on the callback. Never interpreted here.
    #[serde(default)]
    pub state: Option<String>,
}

impl AuthorizationRequest {
    /// A request with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the scope list.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Override the callback URL.
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Attach a round-trip state value.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// Query parameters the provider sends to the callback route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Short-lived authorization code.
    pub code: String,
    /// The state value from the login link, returned verbatim.
    #[serde(default)]
    pub state: Option<String>,
}

impl CallbackQuery {
    /// Build a callback query.
    pub fn new(code: impl Into<String>, state: Option<String>) -> Self {
        Self {
            code: code.into(),
            state,
        }
    }
}

/// An OAuth access token. `Debug` does not print the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for handing to the provider API.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// What the token endpoint gave us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchangeResult {
    /// The access token.
    pub access_token: AccessToken,
    /// Token type as reported by the provider, usually `bearer`.
    pub token_type: Option<String>,
    /// Scopes actually granted.
    pub scope: Option<String>,
}

/// Provider-agnostic identity built from a provider profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Unique user id in the provider's id space.
    pub provider_user_id: String,
    /// Human name if the provider knows one, otherwise the login handle.
    pub display_name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait_url: Option<String>,
    /// Public email. Never filled from a secondary lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The unvalidated state value from the callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Notifications delivered to host listeners during a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A token was obtained. Fired before the profile is fetched.
    TokenIssued {
        /// Display name of the provider, e.g. `GitHub`.
        provider: String,
        /// The token.
        token: AccessToken,
    },
    /// The profile was fetched and normalized.
    IdentityResolved {
        /// Display name of the provider, e.g. `GitHub`.
        provider: String,
        /// The normalized identity.
        record: IdentityRecord,
        /// The unvalidated state value. Checking it is the host's job.
        state: Option<String>,
    },
}

/// The result of a callback whose token exchange succeeded.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// A token was issued but the identity could not be resolved.
    TokenOnly {
        /// The token.
        token: AccessToken,
        /// Why the profile step did not complete.
        reason: AuthError,
    },
    /// Token and identity.
    FullIdentity {
        /// The token.
        token: AccessToken,
        /// The normalized identity.
        record: IdentityRecord,
    },
}

impl CallbackOutcome {
    /// The access token, present in both outcomes.
    pub fn token(&self) -> &AccessToken {
        match self {
            CallbackOutcome::TokenOnly { token, .. } | CallbackOutcome::FullIdentity { token, .. } => {
                token
            }
        }
    }

    /// The identity, if it was resolved.
    pub fn identity(&self) -> Option<&IdentityRecord> {
        match self {
            CallbackOutcome::FullIdentity { record, .. } => Some(record),
            CallbackOutcome::TokenOnly { .. } => None,
        }
    }

    /// Whether the identity was resolved.
    pub fn is_full_identity(&self) -> bool {
        matches!(self, CallbackOutcome::FullIdentity { .. })
    }
}
