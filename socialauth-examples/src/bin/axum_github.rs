//! # Axum GitHub Example
//!
//! Serves a page with a "Sign in with GitHub" link and handles the callback.
//!
//! Configure with:
//! - `SOCIALAUTH_GITHUB_CLIENT_ID` / `SOCIALAUTH_GITHUB_CLIENT_SECRET`
//! - `SOCIALAUTH_GITHUB_REDIRECT_URI` (optional, defaults to `auth/github/callback`)
//! - `SOCIALAUTH_GITHUB_SCOPE` (optional, e.g. `read:user,user:email`)
//! - `SOCIALAUTH_SITE_URL` (optional, defaults to `http://localhost:3000/`)

use async_trait::async_trait;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use socialauth::flow::{LoggingListener, SocialAuth};
use socialauth::github::GithubProvider;
use socialauth::{AuthEvent, AuthListener, AuthorizationRequest, OAuthProvider, ProviderConfig};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use url::Url;

/// State values handed out with login links and not yet seen on a callback.
#[derive(Clone, Default)]
struct IssuedStates(Arc<Mutex<HashSet<String>>>);

impl IssuedStates {
    fn issue(&self, state: String) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(state);
    }

    /// Consume a state; each one is only good for a single callback.
    fn take(&self, state: &str) -> bool {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(state)
    }
}

/// Where an application would create a user or a session from the identity.
struct NewcomerGreeter {
    issued: IssuedStates,
}

#[async_trait]
impl AuthListener for NewcomerGreeter {
    async fn on_event(&self, event: &AuthEvent) {
        if let AuthEvent::IdentityResolved { record, state, .. } = event {
            let known = state.as_deref().is_some_and(|s| self.issued.take(s));
            if !known {
                log::warn!(
                    "Ignoring sign-in of {}: state {:?} was not issued by this site",
                    record.display_name,
                    state
                );
                return;
            }
            log::info!(
                "Welcome {} (email: {})",
                record.display_name,
                record.email.as_deref().unwrap_or("private")
            );
        }
    }
}

#[derive(Clone)]
struct Demo {
    auth: SocialAuth,
    issued: IssuedStates,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let site_url = std::env::var("SOCIALAUTH_SITE_URL")
        .unwrap_or_else(|_| "http://localhost:3000/".to_string());
    let site_url = Url::parse(&site_url)?;

    let github = GithubProvider::new(ProviderConfig::from_env("SOCIALAUTH_GITHUB"))
        .with_callback_resolver(site_url);

    let issued = IssuedStates::default();
    let auth = SocialAuth::builder()
        .provider(github)
        .listener(LoggingListener)
        .listener(NewcomerGreeter {
            issued: issued.clone(),
        })
        .build();

    let app = Router::new()
        .route("/", get(index))
        .with_state(Demo {
            auth: auth.clone(),
            issued,
        })
        .merge(socialauth::axum::router(auth));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    log::info!("Listening on http://localhost:3000");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(Demo { auth, issued }): State<Demo>) -> impl IntoResponse {
    let mut html = String::from("<h1>socialauth</h1>");

    if auth.services().is_empty() {
        html.push_str(
            "<p><i>GitHub is not configured. Set SOCIALAUTH_GITHUB_CLIENT_ID/SECRET.</i></p>",
        );
    }
    for (id, provider) in &auth.providers {
        if !provider.is_available() {
            continue;
        }
        if let Some((url, state)) = auth.initiate_login(id, AuthorizationRequest::new()) {
            issued.issue(state);
            html.push_str(&sign_in_link(&url, provider.display_name()));
        }
    }

    Html(html)
}

fn sign_in_link(url: &str, provider: &str) -> String {
    format!(
        "<p><a href=\"{}\">Sign in with {}</a></p>",
        escape_html(url),
        escape_html(provider)
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
