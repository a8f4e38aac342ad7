use super::*;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct GalleryServerState {
    requested_categories: Arc<Mutex<Vec<String>>>,
    count_requests: Arc<Mutex<u32>>,
}

async fn handle_count(State(state): State<GalleryServerState>) -> Json<serde_json::Value> {
    *state.count_requests.lock().await += 1;
    Json(serde_json::json!({ "count": 128 }))
}

async fn handle_items(
    State(state): State<GalleryServerState>,
    Query(query): Query<ItemsQuery>,
) -> Response {
    state
        .requested_categories
        .lock()
        .await
        .push(query.category.to_string());

    match query.category.as_str() {
        "gallery" => Json(serde_json::json!([
            { "_id": "g1", "imgUrl": "http://img.test/g1.png", "title": "Harbor" },
            { "_id": "g2", "imgUrl": "http://img.test/g2.png", "title": "Orchard" },
            { "_id": "g3", "imgUrl": "http://img.test/g3.png", "title": "Comet" }
        ]))
        .into_response(),
        "wonderSelf" => Json(serde_json::json!([])).into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "duplicated" => Json(serde_json::json!([
            { "_id": "d1", "imgUrl": "http://img.test/d1.png", "title": "One" },
            { "_id": "d1", "imgUrl": "http://img.test/d1b.png", "title": "Again" }
        ]))
        .into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(serde_json::json!([])).into_response()
        }
        _ => (StatusCode::NOT_FOUND, "unknown category").into_response(),
    }
}

async fn spawn_gallery_server() -> (String, GalleryServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = GalleryServerState::default();
    let app = Router::new()
        .route("/", get(handle_items))
        .route("/count", get(handle_count))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn client_for(server_url: &str) -> HttpGalleryClient {
    HttpGalleryClient::new(server_url, DEFAULT_REQUEST_TIMEOUT).expect("client")
}

#[test]
fn endpoints_keep_base_path_without_trailing_slash() {
    let client = client_for("http://gallery.test/api");
    assert_eq!(client.count_url().as_str(), "http://gallery.test/api/count");
    assert_eq!(client.items_url().as_str(), "http://gallery.test/api/");
}

#[test]
fn endpoints_drop_query_from_configured_url() {
    let client = client_for("http://localhost:5000?type=gallery");
    assert_eq!(client.count_url().as_str(), "http://localhost:5000/count");
    assert_eq!(client.items_url().as_str(), "http://localhost:5000/");
}

#[test]
fn rejects_unparseable_and_non_http_urls() {
    let err = HttpGalleryClient::new("not a url", DEFAULT_REQUEST_TIMEOUT)
        .err()
        .expect("should fail");
    assert!(matches!(err, ClientConfigError::InvalidUrl { .. }));

    let err = HttpGalleryClient::new("ftp://gallery.test", DEFAULT_REQUEST_TIMEOUT)
        .err()
        .expect("should fail");
    assert!(matches!(err, ClientConfigError::UnsupportedScheme(scheme) if scheme == "ftp"));
}

#[tokio::test]
async fn fetches_total_count() {
    let (server_url, state) = spawn_gallery_server().await;
    let client = client_for(&server_url);

    let count = client.total_count().await.expect("count");

    assert_eq!(count, 128);
    assert_eq!(*state.count_requests.lock().await, 1);
}

#[tokio::test]
async fn fetches_items_for_category_in_server_order() {
    let (server_url, state) = spawn_gallery_server().await;
    let client = client_for(&server_url);

    let items = client
        .items(&CategoryKey::from("gallery"))
        .await
        .expect("items");

    let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, ["Harbor", "Orchard", "Comet"]);
    assert_eq!(items[0].image_url, "http://img.test/g1.png");
    assert_eq!(
        *state.requested_categories.lock().await,
        vec!["gallery".to_string()]
    );
}

#[tokio::test]
async fn empty_category_is_not_an_error() {
    let (server_url, _state) = spawn_gallery_server().await;
    let items = client_for(&server_url)
        .items(&CategoryKey::from("wonderSelf"))
        .await
        .expect("items");
    assert!(items.is_empty());
}

#[tokio::test]
async fn http_error_status_maps_to_server_error() {
    let (server_url, _state) = spawn_gallery_server().await;
    let err = client_for(&server_url)
        .items(&CategoryKey::from("broken"))
        .await
        .expect_err("should fail");
    assert!(matches!(
        err,
        ClientError::Server {
            status: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn malformed_body_maps_to_server_error() {
    let (server_url, _state) = spawn_gallery_server().await;
    let err = client_for(&server_url)
        .items(&CategoryKey::from("garbled"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Server { status: None, .. }));
}

#[tokio::test]
async fn duplicate_ids_map_to_server_error() {
    let (server_url, _state) = spawn_gallery_server().await;
    let err = client_for(&server_url)
        .items(&CategoryKey::from("duplicated"))
        .await
        .expect_err("should fail");
    match err {
        ClientError::Server { message, .. } => assert!(message.contains("d1")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_maps_to_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };
    let err = client_for(&format!("http://{addr}"))
        .total_count()
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn request_timeout_maps_to_network_error() {
    let (server_url, _state) = spawn_gallery_server().await;
    let client = HttpGalleryClient::new(&server_url, Duration::from_millis(200)).expect("client");
    let err = client
        .items(&CategoryKey::from("slow"))
        .await
        .expect_err("should time out");
    assert!(matches!(err, ClientError::Network(_)));
}
