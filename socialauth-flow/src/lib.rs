//! # Socialauth Flow
//!
//! `socialauth-flow` orchestrates the OAuth2 authorization code flow on top of the providers
//! defined with `socialauth-core`.
//!
//! ## Key Components
//!
//! - **[`CallbackHandler`]**: Exchanges the callback code, announces the token and resolves the identity.
//! - **[`SocialAuth`]**: Holds the registered providers and listeners, and lists the services on offer.
//! - **[`SocialAuthBuilder`]**: A builder for configuring and creating a [`SocialAuth`] instance.

#![warn(missing_docs)]

pub use socialauth_core::{
    AuthError, AuthEvent, AuthListener, AuthorizationRequest, CallbackOutcome, CallbackQuery,
    IdentityRecord, OAuthProvider,
};

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Callback orchestration.
pub mod callback;
/// Listener fan-out.
pub mod listeners;

pub use callback::CallbackHandler;
pub use listeners::{ListenerRegistry, LoggingListener};

/// The login service: every registered provider plus the host's listeners.
#[derive(Clone, Default)]
pub struct SocialAuth {
    /// Registered providers keyed by provider id.
    pub providers: HashMap<String, Arc<dyn OAuthProvider>>,
    listeners: ListenerRegistry,
}

impl SocialAuth {
    /// Create a new [`SocialAuthBuilder`] to configure the service.
    pub fn builder() -> SocialAuthBuilder {
        SocialAuthBuilder::default()
    }

    /// Display names of the providers that are fully configured, sorted.
    ///
    /// A provider missing its client id or secret is registered but not offered.
    pub fn services(&self) -> Vec<String> {
        let mut services: Vec<String> = self
            .providers
            .values()
            .filter(|p| p.is_available())
            .map(|p| p.display_name().to_string())
            .collect();
        services.sort();
        services
    }

    /// A callback handler for one provider, reporting to the registered listeners.
    pub fn handler(&self, provider_id: &str) -> Option<CallbackHandler<Arc<dyn OAuthProvider>>> {
        self.providers.get(provider_id).map(|provider| {
            CallbackHandler::new(provider.clone()).with_listeners(self.listeners.clone())
        })
    }

    /// Build the login link for a provider.
    ///
    /// Unknown providers and providers without a client id yield `None`.
    pub fn authorization_link(
        &self,
        provider_id: &str,
        request: &AuthorizationRequest,
    ) -> Option<String> {
        let link = self
            .providers
            .get(provider_id)
            .and_then(|provider| provider.get_authorization_url(request));
        if link.is_none() {
            debug!("No login link available for provider {provider_id}");
        }
        link
    }

    /// Build the login link, generating a random `state` when the request carries none.
    ///
    /// Returns the link and the state so the host can remember what to expect on the callback.
    pub fn initiate_login(
        &self,
        provider_id: &str,
        mut request: AuthorizationRequest,
    ) -> Option<(String, String)> {
        let state = match request.state.take().filter(|s| !s.is_empty()) {
            Some(state) => state,
            None => uuid::Uuid::new_v4().to_string(),
        };
        request.state = Some(state.clone());
        let url = self.authorization_link(provider_id, &request)?;
        Some((url, state))
    }

    /// Handle a provider callback.
    pub async fn handle_callback(
        &self,
        provider_id: &str,
        query: &CallbackQuery,
    ) -> Result<CallbackOutcome, AuthError> {
        let handler = self
            .handler(provider_id)
            .ok_or(AuthError::ConfigurationMissing("provider"))?;
        handler.handle_callback(query).await
    }
}

/// A builder for configuring and creating a [`SocialAuth`] instance.
#[derive(Default)]
pub struct SocialAuthBuilder {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
    listeners: ListenerRegistry,
}

impl SocialAuthBuilder {
    /// Register a provider. A later provider with the same id replaces the earlier one.
    pub fn provider<P>(mut self, provider: P) -> Self
    where
        P: OAuthProvider + 'static,
    {
        let id = provider.provider_id().to_string();
        self.providers.insert(id, Arc::new(provider));
        self
    }

    /// Register a listener for [`AuthEvent`]s.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: AuthListener + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Build the [`SocialAuth`] instance.
    pub fn build(self) -> SocialAuth {
        SocialAuth {
            providers: self.providers,
            listeners: self.listeners,
        }
    }
}
