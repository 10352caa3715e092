use socialauth_core::{AccessToken, AuthError, OAuthProvider, ProviderConfig, TokenTransport};
use socialauth_providers_github::{GithubEndpoints, GithubProvider};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(config: ProviderConfig) -> (MockServer, GithubProvider) {
    let server = MockServer::start().await;
    let provider = GithubProvider::new(config)
        .with_endpoints(GithubEndpoints::rooted_at(&server.uri(), &server.uri()));
    (server, provider)
}

fn config() -> ProviderConfig {
    ProviderConfig::new("client-1", "secret-1")
}

#[tokio::test]
async fn exchanges_code_for_token() {
    let (server, github) = setup(config()).await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("client_secret=secret-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok1",
            "token_type": "bearer",
            "scope": "user:email"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = github.exchange_code("abc123").await.unwrap();
    assert_eq!(result.access_token.secret(), "tok1");
    assert_eq!(result.token_type.as_deref(), Some("bearer"));
    assert_eq!(result.scope.as_deref(), Some("user:email"));
}

#[tokio::test]
async fn token_endpoint_error_status_is_a_remote_failure() {
    let (server, github) = setup(config()).await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = github.exchange_code("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::RemoteCallFailed(_)), "{err:?}");
}

#[tokio::test]
async fn token_endpoint_garbage_is_malformed() {
    let (server, github) = setup(config()).await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("access_token=tok1&scope="))
        .mount(&server)
        .await;

    let err = github.exchange_code("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn bad_verification_code_is_rejected() {
    let (server, github) = setup(config()).await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        })))
        .mount(&server)
        .await;

    let err = github.exchange_code("stale").await.unwrap_err();
    assert!(matches!(err, AuthError::ProviderRejected { .. }), "{err:?}");
}

#[tokio::test]
async fn missing_secret_never_reaches_the_network() {
    let (server, github) = setup(ProviderConfig::new("client-1", "")).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = github.exchange_code("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::ConfigurationMissing("client_secret")));
}

#[tokio::test]
async fn slow_token_endpoint_times_out() {
    let server = MockServer::start().await;
    let github = GithubProvider::new(config())
        .with_endpoints(GithubEndpoints::rooted_at(&server.uri(), &server.uri()))
        .with_timeout(Duration::from_millis(100));

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "tok1"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = github.exchange_code("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::RemoteCallFailed(_)), "{err:?}");
}

#[tokio::test]
async fn profile_uses_authorization_header_by_default() {
    let (server, github) = setup(config()).await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42,
            "login": "octocat",
            "name": "Mona Lisa",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "email": "octocat@github.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = github.fetch_identity(&AccessToken::new("tok1")).await.unwrap();
    assert_eq!(record.provider_user_id, "42");
    assert_eq!(record.display_name, "Mona Lisa");
    assert_eq!(record.email.as_deref(), Some("octocat@github.com"));
    assert!(record.portrait_url.is_some());
    assert_eq!(record.state, None);
}

#[tokio::test]
async fn profile_query_parameter_transport() {
    let (server, github) =
        setup(config().with_token_transport(TokenTransport::QueryParameter)).await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(query_param("access_token", "tok1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 42, "login": "octocat", "email": ""})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = github.fetch_identity(&AccessToken::new("tok1")).await.unwrap();
    assert_eq!(record.display_name, "octocat");
    assert_eq!(record.email, None);
}

#[tokio::test]
async fn unauthorized_profile_is_a_remote_failure() {
    let (server, github) = setup(config()).await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let err = github.fetch_identity(&AccessToken::new("tok1")).await.unwrap_err();
    assert!(matches!(err, AuthError::RemoteCallFailed(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_provider_is_a_remote_failure() {
    let github = GithubProvider::new(config())
        .with_endpoints(GithubEndpoints::rooted_at("http://127.0.0.1:9", "http://127.0.0.1:9"))
        .with_timeout(Duration::from_secs(2));

    let err = github.exchange_code("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::RemoteCallFailed(_)), "{err:?}");

    let err = github.fetch_identity(&AccessToken::new("tok1")).await.unwrap_err();
    assert!(matches!(err, AuthError::RemoteCallFailed(_)), "{err:?}");
}
