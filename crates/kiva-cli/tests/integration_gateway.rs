//! Integration tests for the development gateway.
//!
//! Requests go through the full router; the proxy tests run a throwaway
//! upstream on an ephemeral port.

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, Uri, header},
    response::IntoResponse,
    routing::{any, get},
};
use indexmap::IndexMap;
use kiva_cli::gateway::{FixtureSet, Gateway};
use kiva_config::{DevServerOptions, ProxyRule};
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("build/js")).unwrap();
    fs::write(temp.path().join("build/index.html"), "<div id=\"root\"></div>").unwrap();
    fs::write(temp.path().join("build/js/app.js"), "console.log(1)").unwrap();
    temp
}

fn options() -> DevServerOptions {
    DevServerOptions {
        compress: false,
        ..DevServerOptions::default()
    }
}

fn fixtures() -> FixtureSet {
    FixtureSet::parse(r#"{ "/users": { "id|1-100": 1, "name": "@first" } }"#).unwrap()
}

async fn send(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn test_mock_fixture_is_rendered() {
    let temp = project();
    let gateway = Gateway::new(&options(), temp.path(), Some(fixtures())).unwrap();

    let (status, body) = send(gateway.router(), "/mock/users").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    let id = json["id"].as_i64().unwrap();
    assert!((1..=100).contains(&id));
    assert!(json["name"].as_str().is_some_and(|name| !name.starts_with('@')));
}

#[tokio::test]
async fn test_unknown_fixture_is_empty_not_found() {
    let temp = project();
    let gateway = Gateway::new(&options(), temp.path(), Some(fixtures())).unwrap();

    let (status, body) = send(gateway.router(), "/mock/orders").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn test_without_fixtures_mock_paths_pass_through() {
    let temp = project();
    let gateway = Gateway::new(&options(), temp.path(), None).unwrap();

    let (status, body) = send(gateway.router(), "/mock/users").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"root\""));
}

#[tokio::test]
async fn test_static_files_and_history_fallback() {
    let temp = project();
    let gateway = Gateway::new(&options(), temp.path(), None).unwrap();
    let router = gateway.router();

    let (status, body) = send(router.clone(), "/js/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1)");

    let (status, body) = send(router, "/settings/profile").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"root\""));
}

#[tokio::test]
async fn test_history_fallback_can_be_disabled() {
    let temp = project();
    let options = DevServerOptions {
        history_api_fallback: false,
        ..options()
    };
    let gateway = Gateway::new(&options, temp.path(), None).unwrap();

    let (status, _) = send(gateway.router(), "/settings/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn spawn_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn echo_upstream() -> String {
    let app = Router::new().route(
        "/health",
        get(|headers: HeaderMap| async move {
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            format!("ok from {host}")
        }),
    );
    spawn_upstream(app).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> impl IntoResponse {
    let seen = |name: &str| headers.contains_key(name);
    (
        StatusCode::IM_A_TEAPOT,
        [("x-upstream", "echo"), ("keep-alive", "timeout=5")],
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "body": body,
            "trace": headers.get("x-trace").and_then(|v| v.to_str().ok()),
            "keepAlive": seen("keep-alive"),
            "proxyAuthorization": seen("proxy-authorization"),
        })),
    )
}

fn proxied(target: &str) -> DevServerOptions {
    let mut options = options();
    options.proxy = IndexMap::from([(
        "/proxy".to_string(),
        ProxyRule {
            target: target.to_string(),
            path_rewrite: IndexMap::from([("^/proxy".to_string(), String::new())]),
            change_origin: true,
        },
    )]);
    options
}

#[tokio::test]
async fn test_proxy_strips_context_and_rewrites_host() {
    let temp = project();
    let target = echo_upstream().await;
    let gateway = Gateway::new(&proxied(&target), temp.path(), None).unwrap();

    let (status, body) = send(gateway.router(), "/proxy/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("ok from {}", target.trim_start_matches("http://")));
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let temp = project();
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let target = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let gateway = Gateway::new(&proxied(&target), temp.path(), None).unwrap();
    let (status, body) = send(gateway.router(), "/proxy/health").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn test_proxy_relays_request_and_response_verbatim() {
    let temp = project();
    let target = spawn_upstream(Router::new().route("/echo", any(echo))).await;
    let gateway = Gateway::new(&proxied(&target), temp.path(), None).unwrap();

    let request = Request::post("/proxy/echo?page=2&sort=name")
        .header("x-trace", "abc")
        .header("keep-alive", "timeout=5")
        .header(header::PROXY_AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .body(Body::from("payload"))
        .unwrap();
    let response = gateway.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.headers()["x-upstream"], "echo");
    assert!(!response.headers().contains_key("keep-alive"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let seen: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["path"], "/echo");
    assert_eq!(seen["query"], "page=2&sort=name");
    assert_eq!(seen["body"], "payload");
    assert_eq!(seen["trace"], "abc");
    assert_eq!(seen["keepAlive"], false);
    assert_eq!(seen["proxyAuthorization"], false);
}
