use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Callback path used when no redirect URI has been configured.
pub const DEFAULT_CALLBACK_PATH: &str = "auth/github/callback";

/// Upper bound for every outbound call to the provider.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Option keys understood by [`ProviderConfig::from_store`].
pub mod keys {
    /// OAuth application client id.
    pub const CLIENT_ID: &str = "client_id";
    /// OAuth application client secret.
    pub const CLIENT_SECRET: &str = "client_secret";
    /// Redirect URI, absolute or relative to the site.
    pub const REDIRECT_URI: &str = "redirect_uri";
    /// Comma separated scope list.
    pub const SCOPE: &str = "scope";
    /// `header` or `query_parameter`.
    pub const TOKEN_TRANSPORT: &str = "token_transport";
}

/// How the access token is presented to the profile endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTransport {
    /// `Authorization: Bearer <token>`.
    #[default]
    Header,
    /// `?access_token=<token>`. Leaks the token into access logs; only for providers that insist.
    QueryParameter,
}

impl TokenTransport {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "header" => Some(TokenTransport::Header),
            "query" | "query_parameter" => Some(TokenTransport::QueryParameter),
            _ => None,
        }
    }
}

/// Provider settings maintained by the host's admin surface.
///
/// The core only ever reads this. Empty or whitespace-only strings are treated the same
/// as absent values.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// OAuth application client id. Without it no login link can be built.
    #[serde(default)]
    pub client_id: String,
    /// OAuth application client secret. Only sent to the token endpoint.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered with the provider.
    #[serde(default, alias = "redirect_uri")]
    pub default_redirect_uri: Option<String>,
    /// Comma separated scopes, passed through verbatim.
    #[serde(default, alias = "scope")]
    pub default_scope: Option<String>,
    /// How the token is sent when fetching the profile.
    #[serde(default)]
    pub token_transport: TokenTransport,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("default_redirect_uri", &self.default_redirect_uri)
            .field("default_scope", &self.default_scope)
            .field("token_transport", &self.token_transport)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a config with the two mandatory credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Default::default()
        }
    }

    /// Set the default redirect URI.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.default_redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set the default scope list.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    /// Set how the token is sent to the profile endpoint.
    pub fn with_token_transport(mut self, transport: TokenTransport) -> Self {
        self.token_transport = transport;
        self
    }

    /// Read the provider settings from a host option store.
    pub fn from_store(store: &dyn OptionStore) -> Self {
        let transport = store
            .get(keys::TOKEN_TRANSPORT)
            .and_then(|v| TokenTransport::parse(&v))
            .unwrap_or_default();

        Self {
            client_id: non_empty(store.get(keys::CLIENT_ID)).unwrap_or_default(),
            client_secret: non_empty(store.get(keys::CLIENT_SECRET)).unwrap_or_default(),
            default_redirect_uri: non_empty(store.get(keys::REDIRECT_URI)),
            default_scope: non_empty(store.get(keys::SCOPE)),
            token_transport: transport,
        }
    }

    /// Read the provider settings from `{PREFIX}_CLIENT_ID`, `{PREFIX}_CLIENT_SECRET`,
    /// `{PREFIX}_REDIRECT_URI`, `{PREFIX}_SCOPE` and `{PREFIX}_TOKEN_TRANSPORT`.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_store(&EnvOptionStore::new(prefix))
    }

    /// The client id, if set.
    pub fn client_id(&self) -> Option<&str> {
        present(&self.client_id)
    }

    /// The client secret, if set.
    pub fn client_secret(&self) -> Option<&str> {
        present(&self.client_secret)
    }

    /// The configured redirect URI, if set.
    pub fn redirect_uri(&self) -> Option<&str> {
        self.default_redirect_uri.as_deref().and_then(present)
    }

    /// The configured scope list, if set.
    pub fn scope(&self) -> Option<&str> {
        self.default_scope.as_deref().and_then(present)
    }

    /// Both credentials are present, so the provider may be offered to users.
    pub fn is_complete(&self) -> bool {
        self.client_id().is_some() && self.client_secret().is_some()
    }

    /// The callback URL the provider should redirect back to.
    pub fn callback_url(&self, resolver: &dyn CallbackUrlResolver) -> String {
        resolver.callback_url(self.redirect_uri().unwrap_or(DEFAULT_CALLBACK_PATH))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn present(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.trim().is_empty())
}

/// The host's key/value option store, scoped to this provider's option group.
pub trait OptionStore: Send + Sync {
    /// Look up a single option.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-process option store.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryOptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an option.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into(), value.into());
    }

    /// Remove an option.
    pub fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MemoryOptionStore {
    fn from(entries: [(&str, &str); N]) -> Self {
        let store = Self::new();
        for (key, value) in entries {
            store.set(key, value);
        }
        store
    }
}

/// Option store backed by prefixed environment variables.
#[derive(Debug, Clone)]
pub struct EnvOptionStore {
    prefix: String,
}

impl EnvOptionStore {
    /// Create a store that reads `{prefix}_{KEY}` variables.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl OptionStore for EnvOptionStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.prefix, key.to_ascii_uppercase())).ok()
    }
}

/// Turns a callback path into the URL the provider should redirect to.
///
/// The host owns its routing table; this is how it tells the core where the
/// callback route lives.
pub trait CallbackUrlResolver: Send + Sync {
    /// Resolve `path` (relative or absolute) to a callback URL.
    fn callback_url(&self, path: &str) -> String;
}

/// Resolver that returns the path unchanged.
///
/// A relative redirect path stays relative, which GitHub will not accept; hosts
/// that rely on the default callback path should resolve against their site URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl CallbackUrlResolver for IdentityResolver {
    fn callback_url(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Joins the path onto a site base URL. Absolute paths and full URLs follow `Url::join` rules.
impl CallbackUrlResolver for Url {
    fn callback_url(&self, path: &str) -> String {
        self.join(path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| path.to_string())
    }
}
