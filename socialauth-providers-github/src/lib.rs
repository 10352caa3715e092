//! # Socialauth GitHub Provider
//!
//! Sign-in with GitHub using the OAuth2 authorization code flow.
//!
//! [`GithubProvider`] builds the authorization link, exchanges the callback code for an
//! access token and turns the `GET /user` profile into an
//! [`IdentityRecord`](socialauth_core::IdentityRecord).

#![warn(missing_docs)]

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use socialauth_core::{
    AccessToken, AuthError, AuthorizationRequest, CallbackUrlResolver, IdentityRecord,
    IdentityResolver, OAuthProvider, ProviderConfig, TokenExchangeResult, TokenTransport,
    DEFAULT_HTTP_TIMEOUT,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// GitHub profile payload and its normalization.
pub mod profile;
pub use profile::GithubUser;

/// Provider identifier used in routes and registries.
pub const PROVIDER_ID: &str = "github";
/// Provider name shown to users and passed to listeners.
pub const DISPLAY_NAME: &str = "GitHub";

const CLIENT_USER_AGENT: &str = concat!("socialauth/", env!("CARGO_PKG_VERSION"));

/// The three GitHub URLs the flow talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubEndpoints {
    /// Browser-facing authorization page.
    pub authorize_url: String,
    /// Code-for-token exchange.
    pub token_url: String,
    /// Authenticated user profile.
    pub user_url: String,
}

impl Default for GithubEndpoints {
    fn default() -> Self {
        Self::rooted_at("https://github.com", "https://api.github.com")
    }
}

impl GithubEndpoints {
    /// Endpoints for a GitHub installation whose web UI and API live under the given roots.
    pub fn rooted_at(web_root: &str, api_root: &str) -> Self {
        let web_root = web_root.trim_end_matches('/');
        let api_root = api_root.trim_end_matches('/');
        Self {
            authorize_url: format!("{web_root}/login/oauth/authorize"),
            token_url: format!("{web_root}/login/oauth/access_token"),
            user_url: format!("{api_root}/user"),
        }
    }
}

/// GitHub OAuth2 provider.
pub struct GithubProvider {
    config: ProviderConfig,
    endpoints: GithubEndpoints,
    callback_resolver: Arc<dyn CallbackUrlResolver>,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl GithubProvider {
    /// Create a provider from its configuration.
    ///
    /// Callback paths are used as-is until a resolver is set with
    /// [`with_callback_resolver`](Self::with_callback_resolver). GitHub only accepts an
    /// absolute `redirect_uri`, so unless the configured redirect URI is already a full
    /// URL, set a resolver (for instance the site's base [`Url`]) before building links.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            endpoints: GithubEndpoints::default(),
            callback_resolver: Arc::new(IdentityResolver),
            http_client: reqwest::Client::new(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Point the provider at different endpoints, e.g. GitHub Enterprise or a test server.
    pub fn with_endpoints(mut self, endpoints: GithubEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set how callback paths become absolute URLs.
    pub fn with_callback_resolver(mut self, resolver: impl CallbackUrlResolver + 'static) -> Self {
        self.callback_resolver = Arc::new(resolver);
        self
    }

    /// Share an existing HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    /// Per-call timeout for the token and profile requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The endpoints in use.
    pub fn endpoints(&self) -> &GithubEndpoints {
        &self.endpoints
    }

    /// Build the authorization link.
    ///
    /// Parameters are emitted in the order `scope`, `redirect_uri`, `state`, `client_id`,
    /// each percent-encoded. Empty overrides count as absent. Returns `None` when no
    /// client id is configured.
    pub fn build_link(&self, request: &AuthorizationRequest) -> Option<String> {
        let Some(client_id) = self.config.client_id() else {
            debug!("GitHub client_id is not configured, no login link");
            return None;
        };

        let scope = non_empty(request.scope.as_deref()).or(self.config.scope());
        let redirect_uri = match non_empty(request.redirect_uri.as_deref()) {
            Some(uri) => uri.to_string(),
            None => self.config.callback_url(self.callback_resolver.as_ref()),
        };
        let state = non_empty(request.state.as_deref());

        let mut url = match Url::parse(&self.endpoints.authorize_url) {
            Ok(url) => url,
            Err(e) => {
                error!(
                    "Invalid GitHub authorize endpoint {}: {e}",
                    self.endpoints.authorize_url
                );
                return None;
            }
        };

        {
            let mut query = url.query_pairs_mut();
            if let Some(scope) = scope {
                query.append_pair("scope", scope);
            }
            query.append_pair("redirect_uri", &redirect_uri);
            if let Some(state) = state {
                query.append_pair("state", state);
            }
            query.append_pair("client_id", client_id);
        }

        debug!("Built GitHub login link redirecting to {redirect_uri}");
        Some(url.to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenEndpointResponse {
    fn into_result(self) -> Result<TokenExchangeResult, AuthError> {
        if let Some(error) = self.error {
            return Err(AuthError::ProviderRejected {
                error,
                description: self.error_description,
            });
        }

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::MalformedResponse("token response has no access_token".to_string())
            })?;

        Ok(TokenExchangeResult {
            access_token: AccessToken::new(access_token),
            token_type: self.token_type,
            scope: self.scope,
        })
    }
}

#[async_trait]
impl OAuthProvider for GithubProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn get_authorization_url(&self, request: &AuthorizationRequest) -> Option<String> {
        self.build_link(request)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResult, AuthError> {
        let client_id = self
            .config
            .client_id()
            .ok_or(AuthError::ConfigurationMissing("client_id"))?;
        let client_secret = self
            .config
            .client_secret()
            .ok_or(AuthError::ConfigurationMissing("client_secret"))?;

        debug!("Exchanging GitHub authorization code at {}", self.endpoints.token_url);

        let body = self
            .http_client
            .post(&self.endpoints.token_url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .timeout(self.timeout)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        serde_json::from_slice::<TokenEndpointResponse>(&body)?.into_result()
    }

    async fn fetch_identity(&self, token: &AccessToken) -> Result<IdentityRecord, AuthError> {
        debug!("Fetching GitHub profile from {}", self.endpoints.user_url);

        let request = self
            .http_client
            .get(&self.endpoints.user_url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .timeout(self.timeout);

        let request = match self.config.token_transport {
            TokenTransport::Header => request.bearer_auth(token.secret()),
            TokenTransport::QueryParameter => request.query(&[("access_token", token.secret())]),
        };

        let body = request
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        serde_json::from_slice::<GithubUser>(&body)?.into_identity()
    }
}
