use super::*;
use crate::test_helpers::StubGateway;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;


/// Router over a scripted gateway, plus the gateway for call assertions
fn create_test_router(gateway: StubGateway) -> (Router, Arc<StubGateway>) {
    create_test_router_with(gateway, Config::default())
}

fn create_test_router_with(gateway: StubGateway, config: Config) -> (Router, Arc<StubGateway>) {
    let gateway = Arc::new(gateway);
    let service = Arc::new(TopicService::new(
        gateway.clone(),
        config.upstream.lookup_page_size,
    ));
    (create_router(service, Arc::new(config)), gateway)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);
    let service = Arc::new(TopicService::new(Arc::new(StubGateway::new()), 1000));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let api_handle = tokio::spawn(start_api_server(service, config, async move {
        stop_rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok(), "server returned {result:?}");
}

#[tokio::test]
async fn test_server_responds_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (app, _) = create_test_router(StubGateway::new());
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/api/v1/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    server_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled_exposes_download_headers() {
    let mut config = Config::default();
    config.api.cors_enabled = true;
    config.api.cors_origins = vec!["*".to_string()];
    let (app, _) = create_test_router_with(StubGateway::new(), config);

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "access-control-allow-origin"),
        Some("*")
    );
    let exposed = header_str(&response, "access-control-expose-headers")
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-disposition"));
    assert!(exposed.contains("x-unresolved-topics"));
    assert!(exposed.contains("x-failed-topics"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = Config::default();
    config.api.cors_origins = vec!["http://localhost:5173".to_string()];
    let (app, _) = create_test_router_with(StubGateway::new(), config);

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("Origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        header_str(&allowed, "access-control-allow-origin"),
        Some("http://localhost:5173")
    );

    let denied = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("Origin", "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(header_str(&denied, "access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.api.cors_enabled = false;
    let (app, _) = create_test_router_with(StubGateway::new(), config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = create_test_router(StubGateway::new());
    let response = app.oneshot(get_request("/api/v1/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
