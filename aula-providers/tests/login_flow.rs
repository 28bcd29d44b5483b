//! Login flow and API version discovery against a mock portal.

mod common;

use aula_fetch::Endpoints;
use aula_providers::{AuthError, Authenticator, ClientError, Credentials};
use common::{api_path, mount_login, mount_probe, mount_profile_context, two_children};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new(common::USERNAME, common::PASSWORD)
}

async fn mount_retired(server: &MockServer, version: u32) {
    Mock::given(method("GET"))
        .and(path(api_path(version)))
        .and(query_param("method", "profiles.getProfilesByLogin"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_skips_retired_versions() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_retired(&server, 19).await;
    mount_retired(&server, 20).await;
    Mock::given(method("GET"))
        .and(path(api_path(21)))
        .and(query_param("method", "profiles.getProfilesByLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": 0, "message": "OK"},
            "data": {"profiles": [{"displayName": "Anna"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(21)))
        .and(query_param("method", "profiles.getProfileContext"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ok(two_children())))
        .mount(&server)
        .await;

    let outcome = Authenticator::new(Endpoints::with_origin(&server.uri()))
        .with_api_version(19)
        .login(&credentials())
        .await
        .unwrap();

    assert_eq!(outcome.session.api().version, 21);
    assert_eq!(outcome.profiles, json!([{"displayName": "Anna"}]));
    assert_eq!(outcome.context.child_ids(), vec!["101", "102"]);
    assert_eq!(outcome.context.guardian_user_id.as_deref(), Some("900"));
    assert_eq!(outcome.session.csrf_token().as_deref(), Some(common::CSRF_TOKEN));
}

#[tokio::test]
async fn test_forbidden_probe_is_access_denied() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(api_path(19)))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = Authenticator::new(Endpoints::with_origin(&server.uri()))
        .login(&credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::AccessDenied));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("password automatically expires"));
}

#[tokio::test]
async fn test_version_range_is_bounded() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    for version in 19..=21 {
        mount_retired(&server, version).await;
    }

    let err = Authenticator::new(Endpoints::with_origin(&server.uri()))
        .with_max_bumps(2)
        .login(&credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::VersionExhausted { first: 19, last: 21 }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_unexpected_probe_status_is_not_fatal() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(api_path(19)))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = Authenticator::new(Endpoints::with_origin(&server.uri()))
        .login(&credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UnexpectedStatus { status: 502, version: 19 }));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_wrong_password_exhausts_redirects() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let err = Authenticator::new(Endpoints::with_origin(&server.uri()))
        .login(&Credentials::new(common::USERNAME, "forkert"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::RedirectLimit { attempts: 10 }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_blank_password_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = Authenticator::new(Endpoints::with_origin(&server.uri()))
        .login(&Credentials::new(common::USERNAME, ""))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MissingCredentials(_)));
}

#[tokio::test]
async fn test_fatal_error_blocks_client_until_credentials_change() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(api_path(19)))
        .and(query_param("method", "profiles.getProfilesByLogin"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut client = common::client(common::config(&server, dir.path()));

    let first = client.refresh().await.unwrap_err();
    assert!(matches!(first, ClientError::Auth(AuthError::AccessDenied)));
    assert!(first.is_blocking());
    assert!(client.blocked_reason().is_some());

    let second = client.refresh().await.unwrap_err();
    assert!(matches!(second, ClientError::Blocked(_)));
    assert!(!client.is_logged_in());

    client.set_credentials(credentials());
    assert!(client.blocked_reason().is_none());
}

#[tokio::test]
async fn test_login_with_good_version_loads_context() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_probe(&server, 19, "OK").await;
    mount_profile_context(&server, two_children()).await;

    let dir = tempfile::tempdir().unwrap();
    let mut client = common::client(common::config(&server, dir.path()));
    client.login().await.unwrap();

    assert!(client.is_logged_in());
    assert_eq!(client.api_version(), Some(19));
    assert_eq!(client.context().children().count(), 2);
}
