use crate::listeners::ListenerRegistry;
use log::{error, info, warn};
use socialauth_core::{
    AuthError, AuthEvent, AuthListener, CallbackOutcome, CallbackQuery, OAuthProvider,
};
use std::sync::Arc;

/// Orchestrates the authorization code callback for one provider.
///
/// The sequence is strictly ordered: exchange the code, announce the token, then make a
/// best-effort attempt to fetch and normalize the profile. Only the exchange can fail the
/// callback; a profile failure is reported as [`CallbackOutcome::TokenOnly`].
pub struct CallbackHandler<P: OAuthProvider> {
    provider: P,
    listeners: ListenerRegistry,
}

impl<P: OAuthProvider> CallbackHandler<P> {
    /// Create a handler with no listeners.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Add a listener.
    pub fn with_listener(mut self, listener: impl AuthListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Replace the listeners with an existing registry.
    pub fn with_listeners(mut self, listeners: ListenerRegistry) -> Self {
        self.listeners = listeners;
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Handle the provider's redirect back to the callback route.
    ///
    /// `state` is passed through untouched; comparing it against what the host issued is
    /// the host's job.
    pub async fn handle_callback(&self, query: &CallbackQuery) -> Result<CallbackOutcome, AuthError> {
        let provider = self.provider.display_name().to_string();

        let exchange = match self.provider.exchange_code(&query.code).await {
            Ok(exchange) => exchange,
            Err(e) => {
                error!("{provider} token exchange failed: {e}");
                return Err(e);
            }
        };
        let token = exchange.access_token;

        self.listeners
            .dispatch(&AuthEvent::TokenIssued {
                provider: provider.clone(),
                token: token.clone(),
            })
            .await;

        let mut record = match self.provider.fetch_identity(&token).await {
            Ok(record) => record,
            Err(reason) => {
                warn!("{provider} profile unavailable, continuing with token only: {reason}");
                return Ok(CallbackOutcome::TokenOnly { token, reason });
            }
        };
        record.state = query.state.clone();

        info!("{provider} identity resolved for user {}", record.provider_user_id);
        self.listeners
            .dispatch(&AuthEvent::IdentityResolved {
                provider,
                record: record.clone(),
                state: query.state.clone(),
            })
            .await;

        Ok(CallbackOutcome::FullIdentity { token, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use socialauth_core::{
        AccessToken, AuthorizationRequest, IdentityRecord, ProviderConfig, TokenExchangeResult,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AuthEvent>>);

    #[async_trait]
    impl AuthListener for Recorder {
        async fn on_event(&self, event: &AuthEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    struct StubProvider {
        config: ProviderConfig,
        token: Option<&'static str>,
        profile: Option<IdentityRecord>,
    }

    #[async_trait]
    impl OAuthProvider for StubProvider {
        fn provider_id(&self) -> &str {
            "stub"
        }

        fn display_name(&self) -> &str {
            "Stub"
        }

        fn config(&self) -> &ProviderConfig {
            &self.config
        }

        fn get_authorization_url(&self, _request: &AuthorizationRequest) -> Option<String> {
            None
        }

        async fn exchange_code(&self, _code: &str) -> Result<TokenExchangeResult, AuthError> {
            self.token
                .map(|t| TokenExchangeResult {
                    access_token: AccessToken::new(t),
                    token_type: None,
                    scope: None,
                })
                .ok_or_else(|| AuthError::RemoteCallFailed("connection refused".into()))
        }

        async fn fetch_identity(&self, _token: &AccessToken) -> Result<IdentityRecord, AuthError> {
            self.profile
                .clone()
                .ok_or_else(|| AuthError::MalformedResponse("no id".into()))
        }
    }

    fn octocat() -> IdentityRecord {
        IdentityRecord {
            provider_user_id: "42".into(),
            display_name: "octocat".into(),
            portrait_url: None,
            email: None,
            state: None,
        }
    }

    #[tokio::test]
    async fn listeners_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));

        struct Tagged(&'static str, Arc<Mutex<Vec<&'static str>>>);

        #[async_trait]
        impl AuthListener for Tagged {
            async fn on_event(&self, _event: &AuthEvent) {
                self.1.lock().unwrap().push(self.0);
            }
        }

        let handler = CallbackHandler::new(StubProvider {
            config: ProviderConfig::new("id", "secret"),
            token: Some("tok1"),
            profile: Some(octocat()),
        })
        .with_listener(Tagged("first", order.clone()))
        .with_listener(Tagged("second", order.clone()));

        handler
            .handle_callback(&CallbackQuery::new("abc", None))
            .await
            .unwrap();

        assert_eq!(
            *order.lock().unwrap(),
            ["first", "second", "first", "second"]
        );
    }

    #[tokio::test]
    async fn state_is_attached_to_the_record() {
        let recorder = Arc::new(Recorder::default());
        let handler = CallbackHandler::new(StubProvider {
            config: ProviderConfig::new("id", "secret"),
            token: Some("tok1"),
            profile: Some(octocat()),
        })
        .with_listener(recorder.clone());

        let outcome = handler
            .handle_callback(&CallbackQuery::new("abc", Some("csrf-1".into())))
            .await
            .unwrap();

        assert_eq!(outcome.identity().unwrap().state.as_deref(), Some("csrf-1"));
        let events = recorder.0.lock().unwrap();
        assert!(matches!(
            &events[1],
            AuthEvent::IdentityResolved { provider, state: Some(state), .. }
                if provider == "Stub" && state == "csrf-1"
        ));
    }

    #[tokio::test]
    async fn profile_failure_keeps_the_token() {
        let recorder = Arc::new(Recorder::default());
        let handler = CallbackHandler::new(StubProvider {
            config: ProviderConfig::new("id", "secret"),
            token: Some("tok1"),
            profile: None,
        })
        .with_listener(recorder.clone());

        let outcome = handler
            .handle_callback(&CallbackQuery::new("abc", None))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CallbackOutcome::TokenOnly { reason: AuthError::MalformedResponse(_), .. }
        ));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exchange_failure_emits_nothing() {
        let recorder = Arc::new(Recorder::default());
        let handler = CallbackHandler::new(StubProvider {
            config: ProviderConfig::new("id", "secret"),
            token: None,
            profile: Some(octocat()),
        })
        .with_listener(recorder.clone());

        let err = handler
            .handle_callback(&CallbackQuery::new("abc", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::RemoteCallFailed(_)));
        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
