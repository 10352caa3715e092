//! # Socialauth
//!
//! Sign in with third-party OAuth2 providers and hand the host a normalized identity.
//!
//! The crate re-exports the workspace members behind feature flags:
//!
//! - `flow`: [`flow::SocialAuth`] and [`flow::CallbackHandler`].
//! - `github`: [`github::GithubProvider`].
//! - `axum`: login and callback routes for axum.
//! - `full`: all of the above.
//!
//! ```rust,ignore
//! use socialauth::flow::{LoggingListener, SocialAuth};
//! use socialauth::github::GithubProvider;
//! use socialauth::ProviderConfig;
//!
//! let auth = SocialAuth::builder()
//!     .provider(GithubProvider::new(ProviderConfig::from_env("SOCIALAUTH_GITHUB")))
//!     .listener(LoggingListener)
//!     .build();
//! ```

pub use socialauth_core::*;

#[cfg(feature = "flow")]
pub use socialauth_flow as flow;

#[cfg(feature = "github")]
pub use socialauth_providers_github as github;

#[cfg(feature = "axum")]
pub use socialauth_axum as axum;
