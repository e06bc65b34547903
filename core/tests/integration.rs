//! End-to-end sends against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own runtime thread, then
//! drives the full pipeline (compose, dispatch over reqwest, interpret)
//! against it. Checks what actually arrived on the wire via `/echo`.

use std::net::SocketAddr;
use std::time::Duration;

use apitester_core::{
    ApiClient, AuthMode, BodyInput, BodyMode, BodyView, DispatchConfig, Dispatcher, HttpMethod,
    KeyValue, RequestDescriptor, StatusClass,
};
use mock_server::Echo;

fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn echo_of(response: &apitester_core::Response) -> Echo {
    serde_json::from_str(&response.result.body).unwrap()
}

#[tokio::test]
async fn post_json_with_params_and_bearer() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}/"));

    let mut req = RequestDescriptor::new(HttpMethod::Post, "echo");
    req.params = vec![
        KeyValue::new("page", "2"),
        KeyValue::default(),
        KeyValue::new("q", "a b"),
    ];
    req.headers = vec![KeyValue::new("X-Trace", "t-1")];
    req.set_body(BodyInput::Json(r#"{"title":"milk"}"#.to_string()));
    req.auth.mode = AuthMode::Bearer;
    req.auth.bearer_token = " tok ".to_string();

    let response = client.send(&req).await;
    assert_eq!(response.result.status, 200);
    assert!(response.result.error.is_none());
    assert!(response.is_json());

    let echo = echo_of(&response);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.as_deref(), Some("page=2&q=a+b"));
    assert_eq!(echo.headers["authorization"], "Bearer tok");
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.headers["x-trace"], "t-1");
    assert_eq!(echo.body, r#"{"title":"milk"}"#);
}

#[tokio::test]
async fn form_body_is_url_encoded() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}"));

    let mut req = RequestDescriptor::new(HttpMethod::Put, "/echo");
    req.switch_body_mode(BodyMode::Form);
    req.set_body(BodyInput::Form(vec![
        KeyValue::new("name", "Ada Lovelace"),
        KeyValue::new("", "skipped"),
        KeyValue::new("lang", "en&fr"),
    ]));

    let echo = echo_of(&client.send(&req).await);
    assert_eq!(echo.body, "name=Ada+Lovelace&lang=en%26fr");
    assert_eq!(
        echo.headers["content-type"],
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn get_never_sends_a_body() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}"));

    let mut req = RequestDescriptor::new(HttpMethod::Get, "/echo");
    req.set_body(BodyInput::Json(r#"{"ignored":true}"#.to_string()));

    let echo = echo_of(&client.send(&req).await);
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.body, "");
    assert!(!echo.headers.contains_key("content-type"));
}

#[tokio::test]
async fn query_api_key_is_appended() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}"));

    let mut req = RequestDescriptor::new(HttpMethod::Delete, "/echo?v=1");
    req.auth.mode = AuthMode::ApiKey;
    req.auth.api_key.name = "api_key".to_string();
    req.auth.api_key.value = "s3cret".to_string();
    req.auth.api_key.location = apitester_core::ApiKeyLocation::Query;

    let echo = echo_of(&client.send(&req).await);
    assert_eq!(echo.query.as_deref(), Some("v=1&api_key=s3cret"));
    assert!(!echo.headers.contains_key("x-api-key"));
}

#[tokio::test]
async fn not_found_is_a_normal_response() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}"));

    let req = RequestDescriptor::new(HttpMethod::Get, "/status/404?body=missing");
    let response = client.send(&req).await;
    assert_eq!(response.result.status, 404);
    assert_eq!(response.result.body, "missing");
    assert!(response.result.error.is_none());
    assert_eq!(response.view, BodyView::Raw);
    assert_eq!(response.status_class(), StatusClass::Error);
}

#[tokio::test]
async fn plain_text_body_falls_back_to_raw() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}"));

    let response = client
        .send(&RequestDescriptor::new(HttpMethod::Get, "/text"))
        .await;
    assert_eq!(response.result.status, 200);
    assert_eq!(response.view, BodyView::Raw);
    assert_eq!(response.copy_text(), Some("plain text, not json"));
}

#[tokio::test]
async fn repeated_response_headers_are_combined() {
    let addr = spawn_server();
    let client = ApiClient::new(&format!("http://{addr}"));

    let response = client
        .send(&RequestDescriptor::new(HttpMethod::Get, "/multi-header"))
        .await;
    assert_eq!(response.result.headers.get("x-multi"), Some("a, b"));
    assert_eq!(response.result.headers.get("content-type"), Some("text/plain"));
}

#[tokio::test]
async fn slow_server_hits_the_timeout() {
    let addr = spawn_server();
    let dispatcher = Dispatcher::new().with_config(DispatchConfig {
        timeout: Duration::from_millis(200),
    });
    let client = ApiClient::new(&format!("http://{addr}")).with_dispatcher(dispatcher);

    let response = client
        .send(&RequestDescriptor::new(HttpMethod::Get, "/delay/5000"))
        .await;
    assert_eq!(response.result.status, 0);
    assert_eq!(
        response.result.error.as_deref(),
        Some("request timed out after 200 ms")
    );
    assert!(response.result.elapsed_ms >= 200);
    assert!(response.result.elapsed_ms < 5000);
    assert_eq!(response.status_class(), StatusClass::Unknown);
}

#[tokio::test]
async fn malformed_url_is_a_transport_failure() {
    let client = ApiClient::new("");
    let response = client
        .send(&RequestDescriptor::new(HttpMethod::Get, "not a url"))
        .await;
    assert_eq!(response.result.status, 0);
    assert!(!response.result.error.unwrap_or_default().is_empty());
    assert!(response.result.body.is_empty());
    assert!(response.result.headers.is_empty());
}

#[tokio::test]
async fn refused_connection_is_a_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(&format!("http://{addr}"));

    let response = client
        .send(&RequestDescriptor::new(HttpMethod::Get, "/echo"))
        .await;
    assert_eq!(response.result.status, 0);
    let error = response.result.error.unwrap();
    assert!(error.starts_with("connection failed"), "{error}");
}
