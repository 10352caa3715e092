//! # Socialauth Axum
//!
//! Mounts the login and callback routes of a [`SocialAuth`] on an axum router:
//!
//! - `GET /auth/{provider}` redirects the browser to the provider's authorization page.
//! - `GET /auth/{provider}/callback` completes the flow.
//!
//! The `state` query value is handed through untouched. Comparing it with the value issued
//! at login is left to the application.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use log::error;
use serde::Serialize;
use socialauth_core::{
    AuthError, AuthorizationRequest, CallbackQuery, IdentityRecord, OAuthProvider,
};
use socialauth_flow::SocialAuth;
use std::sync::Arc;

/// Errors returned by the login and callback routes.
#[derive(Debug)]
pub enum SocialAuthAxumError {
    /// The provider is unknown or not configured.
    NotFound(String),
    /// The provider could not be reached or gave an unusable answer.
    BadGateway(String),
}

impl From<AuthError> for SocialAuthAxumError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ConfigurationMissing(_) => SocialAuthAxumError::NotFound(err.to_string()),
            other => SocialAuthAxumError::BadGateway(other.to_string()),
        }
    }
}

impl IntoResponse for SocialAuthAxumError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SocialAuthAxumError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            SocialAuthAxumError::BadGateway(m) => (StatusCode::BAD_GATEWAY, m),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Body of a successful callback. The access token is never sent to the browser.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    /// Provider display name.
    pub provider: String,
    /// The resolved identity, `null` when only the token could be obtained.
    pub identity: Option<IdentityRecord>,
}

/// Build a router serving the login and callback routes for every provider in `auth`.
pub fn router<S>(auth: SocialAuth) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/{provider}", get(login_handler))
        .route("/auth/{provider}/callback", get(callback_handler))
        .with_state(Arc::new(auth))
}

/// Redirects to the provider's authorization page.
pub async fn login_handler(
    State(auth): State<Arc<SocialAuth>>,
    Path(provider): Path<String>,
    Query(request): Query<AuthorizationRequest>,
) -> Result<Redirect, SocialAuthAxumError> {
    auth.authorization_link(&provider, &request)
        .map(|url| Redirect::to(&url))
        .ok_or_else(|| SocialAuthAxumError::NotFound(format!("{provider} login is not available")))
}

/// Completes the authorization code flow.
pub async fn callback_handler(
    State(auth): State<Arc<SocialAuth>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, SocialAuthAxumError> {
    let handler = auth
        .handler(&provider)
        .ok_or_else(|| SocialAuthAxumError::NotFound(format!("unknown provider {provider}")))?;
    let display_name = handler.provider().display_name().to_string();

    let outcome = handler.handle_callback(&query).await.map_err(|e| {
        error!("{display_name} callback failed: {e}");
        SocialAuthAxumError::from(e)
    })?;

    Ok(Json(CallbackResponse {
        provider: display_name,
        identity: outcome.identity().cloned(),
    }))
}
