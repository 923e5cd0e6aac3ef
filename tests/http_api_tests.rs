//! Router-level tests driving the HTTP surface without a socket.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use lan_discovery::prelude::*;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const LISTING: &str = "<ul>{{ for device in devices }}<li>{device.id}:{device.name}@{device.address}</li>{{ endfor }}</ul>";

struct Harness {
    registry: Arc<Registry>,
    clock: Arc<ManualClock>,
    app: Router,
}

fn harness(trust_proxy: bool) -> Harness {
    let clock = Arc::new(ManualClock::default());
    let registry = Arc::new(Registry::with_clock(clock.clone()));
    let templates = InMemoryTemplates::new().with_template("devices.lan", LISTING);
    let state = AppState::new(registry.clone(), Arc::new(templates)).with_trust_proxy(trust_proxy);
    let app = create_router(state, Path::new("/nonexistent/assets"));
    Harness { registry, clock, app }
}

fn request(method: Method, uri: &str, peer: &str) -> Request<Body> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "devices.lan:8080")
        .body(Body::empty())
        .unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(peer));
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

async fn devices_json(app: &Router, peer: &str) -> DeviceList {
    let (status, content_type, body) = send(app, request(Method::GET, "/devices.json", peer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn register_then_discover_round_trip() {
    let h = harness(true);

    let (status, _, body) = send(
        &h.app,
        request(
            Method::POST,
            "/?id=dev1&name=Printer&address=10.0.0.5%3A9100",
            "192.168.1.10:50000",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let list = devices_json(&h.app, "192.168.1.10:50001").await;
    assert_eq!(list.devices.len(), 1);
    let device = &list.devices[0];
    assert_eq!(device.id, "dev1");
    assert_eq!(device.name, "Printer");
    assert_eq!(device.address, "10.0.0.5:9100");
    assert_eq!(device.updated, h.clock.now());
}

#[tokio::test]
async fn json_body_shape() {
    let h = harness(true);
    send(&h.app, request(Method::POST, "/?id=a&name=A&address=x", "10.0.0.1:1")).await;

    let (_, _, body) = send(&h.app, request(Method::GET, "/devices.json", "10.0.0.1:2")).await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let device = &value["devices"][0];
    let mut keys: Vec<_> = device.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["address", "id", "name", "updated"]);
}

#[tokio::test]
async fn register_without_params_still_succeeds() {
    let h = harness(true);
    let (status, _, _) = send(&h.app, request(Method::POST, "/", "10.0.0.1:1")).await;
    assert_eq!(status, StatusCode::OK);

    let list = devices_json(&h.app, "10.0.0.1:1").await;
    assert_eq!(list.devices.len(), 1);
    assert_eq!(list.devices[0].id, "");
    assert_eq!(list.devices[0].name, "");
}

#[tokio::test]
async fn id_defaults_to_name() {
    let h = harness(true);
    send(&h.app, request(Method::POST, "/?name=Speaker&address=a", "10.0.0.1:1")).await;
    send(&h.app, request(Method::POST, "/?name=Speaker&address=b", "10.0.0.1:1")).await;

    let list = devices_json(&h.app, "10.0.0.1:1").await;
    assert_eq!(list.devices.len(), 1);
    assert_eq!(list.devices[0].id, "Speaker");
    assert_eq!(list.devices[0].address, "b");
}

#[tokio::test]
async fn malformed_queries_are_accepted() {
    let cases = [
        ("/?name=a&name=b&address=1", "b", "b"),
        ("/?name=%FF%FE", "\u{FFFD}\u{FFFD}", "\u{FFFD}\u{FFFD}"),
        ("/?%zz=1&name=q", "q", "q"),
        ("/?id&name", "", ""),
    ];
    for (uri, expected_id, expected_name) in cases {
        let h = harness(true);
        let (status, _, _) = send(&h.app, request(Method::POST, uri, "10.0.0.1:1")).await;
        assert_eq!(status, StatusCode::OK, "{uri}");

        let devices = h.registry.discover("10.0.0.1");
        assert_eq!(devices.len(), 1, "{uri}");
        assert_eq!(devices[0].id, expected_id, "{uri}");
        assert_eq!(devices[0].name, expected_name, "{uri}");
    }
}

#[tokio::test]
async fn partitions_by_caller_address() {
    let h = harness(false);
    send(&h.app, request(Method::POST, "/?id=a&name=A&address=x", "10.0.0.1:1")).await;
    send(&h.app, request(Method::POST, "/?id=b&name=B&address=y", "10.0.0.2:1")).await;

    let first = devices_json(&h.app, "10.0.0.1:9").await;
    assert_eq!(first.devices.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), ["a"]);

    let unknown = devices_json(&h.app, "10.9.9.9:9").await;
    assert!(unknown.devices.is_empty());
}

#[tokio::test]
async fn forwarded_for_is_honoured_only_when_trusted() {
    for (trust_proxy, expected_partition) in [(true, "203.0.113.7"), (false, "10.0.0.254")] {
        let h = harness(trust_proxy);
        let mut req = request(Method::POST, "/?id=a&name=A&address=x", "10.0.0.254:443");
        req.headers_mut()
            .insert("x-forwarded-for", "203.0.113.7, 10.0.0.254".parse().unwrap());
        send(&h.app, req).await;

        assert_eq!(h.registry.discover(expected_partition).len(), 1);
        assert_eq!(h.registry.partition_count(), 1);
    }
}

#[tokio::test]
async fn html_listing_renders_same_snapshot_as_json() {
    let h = harness(true);
    send(&h.app, request(Method::POST, "/?id=dev1&name=Printer&address=p", "10.0.0.1:1")).await;
    send(&h.app, request(Method::POST, "/?id=dev2&name=NAS&address=n", "10.0.0.1:1")).await;

    let (status, content_type, html) = send(&h.app, request(Method::GET, "/", "10.0.0.1:1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert_eq!(html, "<ul><li>dev1:Printer@p</li><li>dev2:NAS@n</li></ul>");

    let list = devices_json(&h.app, "10.0.0.1:1").await;
    let ids: Vec<_> = list.devices.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["dev1", "dev2"]);
}

#[tokio::test]
async fn missing_template_is_a_bare_500() {
    let h = harness(true);
    let mut req = request(Method::GET, "/", "10.0.0.1:1");
    req.headers_mut()
        .insert(header::HOST, "unknown.lan".parse().unwrap());

    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn culled_devices_disappear_from_discovery() {
    let h = harness(true);
    send(&h.app, request(Method::POST, "/?id=old&name=old&address=1", "10.0.0.1:1")).await;
    h.clock.advance(Duration::from_secs(6 * 3600 + 1));
    send(&h.app, request(Method::POST, "/?id=new&name=new&address=2", "10.0.0.1:1")).await;

    let report = h.registry.cull(Duration::from_secs(6 * 3600));
    assert_eq!(report.devices_removed, 1);

    let list = devices_json(&h.app, "10.0.0.1:1").await;
    assert_eq!(list.devices.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), ["new"]);
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let h = harness(true);
    let mut req = request(Method::GET, "/devices.json", "10.0.0.1:1");
    req.headers_mut()
        .insert(header::ORIGIN, "http://other.example".parse().unwrap());

    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn unknown_paths_fall_through_to_assets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.css"), "body {}").unwrap();

    let state = AppState::new(Arc::new(Registry::new()), Arc::new(InMemoryTemplates::new()));
    let app = create_router(state, dir.path());

    let (status, _, body) = send(&app, request(Method::GET, "/app.css", "10.0.0.1:1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body {}");

    let (status, _, _) = send(&app, request(Method::GET, "/missing.js", "10.0.0.1:1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn routes_win_over_asset_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "static page").unwrap();

    let templates = InMemoryTemplates::new().with_template("devices.lan", LISTING);
    let state = AppState::new(Arc::new(Registry::new()), Arc::new(templates));
    let app = create_router(state, dir.path());

    let (status, _, body) = send(&app, request(Method::GET, "/", "10.0.0.1:1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<ul></ul>");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_over_http() {
    let h = harness(true);
    let mut tasks = Vec::new();
    for i in 0..32 {
        let app = h.app.clone();
        tasks.push(tokio::spawn(async move {
            let uri = format!("/?id=dev{i}&name=n{i}&address=a{i}");
            send(&app, request(Method::POST, &uri, "10.0.0.1:1")).await.0
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(h.registry.discover("10.0.0.1").len(), 32);
}
