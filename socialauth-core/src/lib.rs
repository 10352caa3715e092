//! # Socialauth Core
//!
//! `socialauth-core` provides the foundational traits and types for the socialauth login framework.
//! It defines the identity schema, the provider configuration surface, the events handed to the
//! host and the traits a provider implements.

#![warn(missing_docs)]

use async_trait::async_trait;
use std::sync::Arc;

/// Errors that can occur during the authentication process.
pub mod error;
pub use crate::error::AuthError;

/// Provider configuration and the host collaborators it is read from.
pub mod config;
pub use crate::config::{
    CallbackUrlResolver, IdentityResolver, MemoryOptionStore, OptionStore, ProviderConfig,
    TokenTransport, DEFAULT_CALLBACK_PATH, DEFAULT_HTTP_TIMEOUT,
};

/// Per-request values: link overrides, callback query, tokens, identities and events.
pub mod state;
pub use crate::state::{
    AccessToken, AuthEvent, AuthorizationRequest, CallbackOutcome, CallbackQuery,
    IdentityRecord, TokenExchangeResult,
};

/// Trait for an OAuth2 provider speaking the authorization code flow.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Get the provider identifier, e.g. `github`.
    fn provider_id(&self) -> &str;

    /// Human-facing provider name, e.g. `GitHub`.
    fn display_name(&self) -> &str;

    /// The configuration this provider was built from.
    fn config(&self) -> &ProviderConfig;

    /// Whether the provider is configured well enough to be offered to users.
    fn is_available(&self) -> bool {
        self.config().is_complete()
    }

    /// Build the authorization URL, or `None` when the config has no client id.
    fn get_authorization_url(&self, request: &AuthorizationRequest) -> Option<String>;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResult, AuthError>;

    /// Fetch the user's profile and normalize it.
    async fn fetch_identity(&self, token: &AccessToken) -> Result<IdentityRecord, AuthError>;
}

#[async_trait]
impl<T: OAuthProvider + ?Sized> OAuthProvider for Arc<T> {
    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn config(&self) -> &ProviderConfig {
        (**self).config()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get_authorization_url(&self, request: &AuthorizationRequest) -> Option<String> {
        (**self).get_authorization_url(request)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResult, AuthError> {
        (**self).exchange_code(code).await
    }

    async fn fetch_identity(&self, token: &AccessToken) -> Result<IdentityRecord, AuthError> {
        (**self).fetch_identity(token).await
    }
}

/// Trait for host components interested in login events.
///
/// Listeners cannot fail the flow; they observe it.
#[async_trait]
pub trait AuthListener: Send + Sync {
    /// Handle a single event.
    async fn on_event(&self, event: &AuthEvent);
}

#[async_trait]
impl AuthListener for () {
    async fn on_event(&self, _event: &AuthEvent) {}
}

#[async_trait]
impl<T: AuthListener + ?Sized> AuthListener for Arc<T> {
    async fn on_event(&self, event: &AuthEvent) {
        (**self).on_event(event).await
    }
}
