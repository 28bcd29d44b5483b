//! Mock portal shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use aula_fetch::Endpoints;
use aula_providers::{AulaClient, ClientConfig, Credentials};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "anna0001";
pub const PASSWORD: &str = "hemmelig";
pub const CSRF_TOKEN: &str = "tok123";
pub const VERSION: u32 = 19;

const ENTRY_PAGE: &str = r#"<html><body>
<form method="post" action="/broker/idp">
  <input type="hidden" name="selectedIdp" value="">
</form>
</body></html>"#;

const CREDENTIALS_PAGE: &str = r#"<html><body>
<form method="post" action="/broker/login">
  <input type="hidden" name="state" value="abc">
  <input type="text" name="username" value="">
  <input type="password" name="password" value="">
  <input type="hidden" name="selected-aktoer" value="">
</form>
</body></html>"#;

/// Path of the versioned API.
pub fn api_path(version: u32) -> String {
    format!("/api/v{version}")
}

/// Portal envelope with status OK.
pub fn ok(data: Value) -> Value {
    json!({"status": {"code": 0, "message": "OK"}, "data": data})
}

/// Profile context `data` with the given `(id, name, user id)` children.
pub fn context_data(children: &[(u64, &str, u64)]) -> Value {
    let children: Vec<Value> = children
        .iter()
        .map(|(id, name, user_id)| json!({"id": id, "name": name, "userId": user_id}))
        .collect();
    json!({
        "userId": 900,
        "institutions": [{
            "name": "Holme Skole",
            "institutionCode": "751001",
            "children": children
        }]
    })
}

/// The two children most tests use.
pub fn two_children() -> Value {
    context_data(&[(101, "Emilie Hansen", 501), (102, "Karla Hansen", 502)])
}

/// Client configuration pointing at the mock server.
pub fn config(server: &MockServer, dir: &Path) -> ClientConfig {
    ClientConfig {
        endpoints: Endpoints::with_origin(&server.uri()),
        calendar_path: dir.join("skoleskema.json"),
        ..ClientConfig::default()
    }
}

/// Client with the test credentials.
pub fn client(config: ClientConfig) -> AulaClient {
    AulaClient::new(Credentials::new(USERNAME, PASSWORD), config).unwrap()
}

/// Broker pages: entry form, IdP selection, credential form, portal home.
///
/// Only the right credentials redirect to the portal; anything else gets
/// the credential form again.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTRY_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/broker/idp"))
        .and(body_string_contains("selectedIdp=uni_idp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CREDENTIALS_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/broker/login"))
        .and(body_string_contains(format!("username={USERNAME}")))
        .and(body_string_contains(format!("password={PASSWORD}")))
        .and(body_string_contains("selected-aktoer=KONTAKT"))
        .and(body_string_contains("state=abc"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/portal/"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/broker/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CREDENTIALS_PAGE))
        .with_priority(10)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/portal/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("Csrfp-Token={CSRF_TOKEN}; Path=/"))
                .set_body_string("<html>Aula</html>"),
        )
        .mount(server)
        .await;
}

/// Version probe and liveness check answering with `message`.
pub async fn mount_probe(server: &MockServer, version: u32, message: &str) {
    Mock::given(method("GET"))
        .and(path(api_path(version)))
        .and(query_param("method", "profiles.getProfilesByLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": 0, "message": message},
            "data": {"profiles": [{"portalRole": "guardian"}]}
        })))
        .mount(server)
        .await;
}

/// Guardian profile context.
pub async fn mount_profile_context(server: &MockServer, data: Value) {
    Mock::given(method("GET"))
        .and(path(api_path(VERSION)))
        .and(query_param("method", "profiles.getProfileContext"))
        .and(query_param("portalrole", "guardian"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(data)))
        .mount(server)
        .await;
}

/// Widget configuration with the given ids.
pub async fn mount_widgets(server: &MockServer, widget_ids: &[&str]) {
    let configs: Vec<Value> = widget_ids
        .iter()
        .map(|id| json!({"widget": {"widgetId": id, "name": format!("Widget {id}")}}))
        .collect();
    Mock::given(method("GET"))
        .and(path(api_path(VERSION)))
        .and(query_param("method", "profiles.getProfileContext"))
        .and(query_param_is_missing("portalrole"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "moduleWidgetConfiguration": {"widgetConfigurations": configs}
        }))))
        .mount(server)
        .await;
}

/// Token for every widget.
pub async fn mount_tokens(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(api_path(VERSION)))
        .and(query_param("method", "aulaToken.getAulaToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!("widget-token"))))
        .mount(server)
        .await;
}

/// Presence overview for one child.
pub async fn mount_presence(server: &MockServer, child_id: u64, overview: Value) {
    Mock::given(method("GET"))
        .and(path(api_path(VERSION)))
        .and(query_param("method", "presence.getDailyOverview"))
        .and(query_param("childIds[]", child_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(overview)))
        .mount(server)
        .await;
}

/// Thread list.
pub async fn mount_threads(server: &MockServer, threads: Value) {
    Mock::given(method("GET"))
        .and(path(api_path(VERSION)))
        .and(query_param("method", "messaging.getThreads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({"threads": threads}))))
        .mount(server)
        .await;
}

/// Everything a plain refresh needs: login, liveness OK, two children,
/// presence for both and no unread threads.
pub async fn mount_portal(server: &MockServer) {
    mount_login(server).await;
    mount_probe(server, VERSION, "OK").await;
    mount_profile_context(server, two_children()).await;
    mount_presence(server, 101, json!([{"status": 3, "checkInTime": "08:01:00"}])).await;
    mount_presence(server, 102, json!([])).await;
    mount_threads(server, json!([])).await;
}
