#![allow(dead_code)]

use transkribus::{Client, ClientBuilder};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Login/refresh response body carrying `session_id`.
pub fn session_xml(session_id: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <trpUserLogin><userId>1</userId><userName>alice</userName>\
         <sessionId>{session_id}</sessionId></trpUserLogin>"
    )
}

/// Mount a login endpoint that accepts alice/secret once and hands out `session_id`.
pub async fn mock_login(server: &MockServer, session_id: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_string_contains("user=alice"))
        .and(body_string_contains("pw=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(session_xml(session_id)))
        .expect(1)
        .mount(server)
        .await;
}

/// A client logged in against the mock server with session `tok-1`.
pub async fn logged_in_client(server: &MockServer) -> Client {
    mock_login(server, "tok-1").await;
    ClientBuilder::new()
        .credentials("alice", "secret")
        .base_url(server.uri())
        .login()
        .await
        .expect("login against mock server")
}
