//! Prints the GitHub login link for the configuration in the environment or a `.env` file.
//!
//! ```text
//! cargo run --bin login_link -- [scope] [state]
//! ```
//!
//! The default callback path is resolved against `SOCIALAUTH_SITE_URL`
//! (`http://localhost:3000/` when unset).

use socialauth::github::GithubProvider;
use socialauth::{AuthorizationRequest, ProviderConfig};
use std::process::ExitCode;
use url::Url;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut request = AuthorizationRequest::new();
    if let Some(scope) = args.next() {
        request = request.scope(scope);
    }
    if let Some(state) = args.next() {
        request = request.state(state);
    }

    let site_url = std::env::var("SOCIALAUTH_SITE_URL")
        .unwrap_or_else(|_| "http://localhost:3000/".to_string());
    let site_url = match Url::parse(&site_url) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("SOCIALAUTH_SITE_URL is not a valid URL: {e}");
            return ExitCode::FAILURE;
        }
    };

    let github = GithubProvider::new(ProviderConfig::from_env("SOCIALAUTH_GITHUB"))
        .with_callback_resolver(site_url);
    match github.build_link(&request) {
        Some(link) => {
            println!("{link}");
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("SOCIALAUTH_GITHUB_CLIENT_ID is not set");
            ExitCode::FAILURE
        }
    }
}
