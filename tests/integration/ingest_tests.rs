//! Integration tests for the ingesters
//!
//! These tests use wiremock to stand in for a site's content API and a
//! temporary SQLite file as the destination store. The MySQL store is only
//! exercised up to connection setup.

use metart_mirror::config::{parse_toml, ApiConfig};
use metart_mirror::crawler::{ingest, Engine, GalleryCatalog, ModelCatalog};
use metart_mirror::source::{build_http_client, Kind, RetryPolicy, SourceClient};
use metart_mirror::storage::{
    open_sqlite_writer, ConnectionProvider, PerCallProvider, SqliteStore, Writer,
};
use metart_mirror::IngestError;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(server: &MockServer) -> SourceClient {
    let http = build_http_client(&ApiConfig::default(), false).expect("Failed to build client");
    SourceClient::new(
        http,
        server.uri(),
        RetryPolicy::fixed(Duration::from_millis(10)).with_max_attempts(3),
    )
}

async fn create_writer(dir: &TempDir) -> Writer<SqliteStore<PerCallProvider>> {
    open_sqlite_writer(&dir.path().join("mirror.sqlite3"), "metart")
        .await
        .expect("Failed to open store")
}

fn gallery_detail(uuid: &str, name: &str, path: &str, model_uuids: &[&str]) -> Value {
    let models: Vec<Value> = model_uuids.iter().map(|m| json!({"UUID": m})).collect();
    json!({
        "UUID": uuid,
        "coverCleanImagePath": format!("/media/{}/clean.jpg", uuid),
        "coverImagePath": format!("/media/{}/cover.jpg", uuid),
        "description": "",
        "metaDescription": "Meta",
        "name": name,
        "path": path,
        "publishedAt": "2024-02-02T09:15:00.000Z",
        "siteUUID": "site-1",
        "thumbnailCoverPath": format!("/media/{}/thumb.jpg", uuid),
        "type": "GALLERY",
        "originalUUID": null,
        "models": models
    })
}

fn model_detail(uuid: &str, name: &str, size: &str) -> Value {
    json!({
        "UUID": uuid,
        "biography": "Biography",
        "breasts": "Medium",
        "debutYear": "1998",
        "debutMonth": "March",
        "globalUUID": format!("global-{}", uuid),
        "hair": "Brown",
        "headshotImagePath": "/headshot.jpg",
        "height": 170,
        "name": name,
        "path": format!("/model/{}", uuid),
        "siteUUID": "site-1",
        "size": size,
        "topRank": 3,
        "weight": 52,
        "pubicHair": "Trimmed",
        "publishAge": 21,
        "ethnicity": "Caucasian",
        "eyes": "Green",
        "gender": "female"
    })
}

fn movie_detail(uuid: &str, name: &str, path: &str, model_uuids: &[&str]) -> Value {
    let mut detail = gallery_detail(uuid, name, path, model_uuids);
    let fields = detail.as_object_mut().unwrap();
    fields.insert("type".to_string(), json!("MOVIE"));
    fields.remove("originalUUID");
    detail
}

/// Mounts a one-page movie listing and a two-page gallery listing
///
/// Page 2 holds the newest gallery, page 1 the oldest.
async fn mount_gallery_site(server: &MockServer, expected_detail_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/movies"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "galleries": [{
                "UUID": "mv-1",
                "name": "Behind the Scenes",
                "path": "/model/anna/movie/20231215/BEHIND_THE_SCENES"
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/movie"))
        .and(query_param("name", "BEHIND_THE_SCENES"))
        .and(query_param("date", "20231215"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_detail(
            "mv-1",
            "Behind the Scenes",
            "/model/anna/movie/20231215/BEHIND_THE_SCENES",
            &["m-anna"],
        )))
        .expect(expected_detail_calls)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/galleries"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 61,
            "galleries": [{
                "UUID": "g-old",
                "name": "Morning Light",
                "path": "/model/anna/gallery/20240101/MORNING_LIGHT"
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/galleries"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 61,
            "galleries": [{
                "UUID": "g-new",
                "name": "Sunset: Part 2",
                "path": "/model/anna/gallery/20240202/SUNSET_PART_2"
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gallery"))
        .and(query_param("name", "MORNING_LIGHT"))
        .and(query_param("date", "20240101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gallery_detail(
            "g-old",
            "Morning Light",
            "/model/anna/gallery/20240101/MORNING_LIGHT",
            &["m-anna"],
        )))
        .expect(expected_detail_calls)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gallery"))
        .and(query_param("name", "SUNSET__PART_2"))
        .and(query_param("date", "20240202"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gallery_detail(
            "g-new",
            "Sunset: Part 2",
            "/model/anna/gallery/20240202/SUNSET_PART_2",
            &["m-anna", "m-zoe"],
        )))
        .expect(expected_detail_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_gallery_ingest_writes_galleries_and_relations() {
    let mock_server = MockServer::start().await;
    mount_gallery_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let writer = create_writer(&dir).await;
    let client = create_client(&mock_server);

    let stats = Engine::new(&client, &writer)
        .run(&GalleryCatalog)
        .await
        .expect("Ingest failed");

    assert_eq!(stats.pages_visited, 3);
    assert_eq!(stats.items_seen, 3);
    assert_eq!(stats.items_skipped, 0);
    assert_eq!(stats.details_fetched, 3);
    assert_eq!(stats.rows_written, 7);

    let tables = writer.tables();
    assert_eq!(writer.count_rows(&tables.gallery).await.unwrap(), 3);
    assert_eq!(writer.count_rows(&tables.model_gallery).await.unwrap(), 4);

    let (published, description): (String, Option<String>) = writer
        .store()
        .provider()
        .with_connection(|conn| {
            conn.query_row(
                "SELECT published_at, description FROM metart_gallery WHERE uuid = 'g-new'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
        })
        .unwrap();
    assert_eq!(published, "2024-02-02");
    assert_eq!(description, None);

    let (kind, splash, original): (String, Option<String>, Option<String>) = writer
        .store()
        .provider()
        .with_connection(|conn| {
            conn.query_row(
                "SELECT type, splash_image_path, original_uuid FROM metart_gallery WHERE uuid = 'mv-1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
        })
        .unwrap();
    assert_eq!(kind, "MOVIE");
    assert_eq!(splash.as_deref(), Some("/media/mv-1/thumb.jpg"));
    assert_eq!(original, None);
}

#[tokio::test]
async fn test_gallery_pages_visited_in_descending_order() {
    let mock_server = MockServer::start().await;
    mount_gallery_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let writer = create_writer(&dir).await;
    let client = create_client(&mock_server);

    Engine::new(&client, &writer)
        .run(&GalleryCatalog)
        .await
        .expect("Ingest failed");

    let requests = mock_server.received_requests().await.unwrap();
    let list_pages: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == "/api/galleries")
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.into_owned())
        })
        .collect();

    // Count request first, then pages 2 and 1
    assert_eq!(list_pages, vec!["1", "2", "1"]);

    let detail_names: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == "/api/gallery")
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "name")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(detail_names, vec!["SUNSET__PART_2", "MORNING_LIGHT"]);

    // Movies are finished before the gallery listing is touched
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(
        paths,
        vec![
            "/api/movies",
            "/api/movies",
            "/api/movie",
            "/api/galleries",
            "/api/galleries",
            "/api/gallery",
            "/api/galleries",
            "/api/gallery",
        ]
    );
}

#[tokio::test]
async fn test_kind_with_no_items_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "galleries": []})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/galleries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": -1, "galleries": []})))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let writer = create_writer(&dir).await;
    let client = create_client(&mock_server);

    let stats = Engine::new(&client, &writer)
        .run(&GalleryCatalog)
        .await
        .expect("Ingest failed");

    assert_eq!(stats.pages_visited, 0);
    assert_eq!(stats.items_seen, 0);

    // Only the two count requests
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_second_gallery_run_skips_existing_items() {
    let mock_server = MockServer::start().await;
    // Each detail endpoint may be hit once across both runs
    mount_gallery_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let writer = create_writer(&dir).await;
    let client = create_client(&mock_server);
    let engine = Engine::new(&client, &writer);

    engine.run(&GalleryCatalog).await.expect("First run failed");
    let second = engine.run(&GalleryCatalog).await.expect("Second run failed");

    assert_eq!(second.items_seen, 3);
    assert_eq!(second.items_skipped, 3);
    assert_eq!(second.details_fetched, 0);
    assert_eq!(second.rows_written, 0);

    let tables = writer.tables();
    assert_eq!(writer.count_rows(&tables.gallery).await.unwrap(), 3);
    assert_eq!(writer.count_rows(&tables.model_gallery).await.unwrap(), 4);
}

#[tokio::test]
async fn test_model_ingest_refreshes_every_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "models": [
                {"UUID": "m-anna", "name": "Anna B"},
                {"UUID": "m-zoe", "name": "Zoë"}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/model"))
        .and(query_param("name", "Anna B"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(model_detail("m-anna", "Anna B", "34/24/35")),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/model"))
        .and(query_param("name", "Zoë"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_detail("m-zoe", "Zoë", "32/23")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let writer = create_writer(&dir).await;
    let client = create_client(&mock_server);
    let engine = Engine::new(&client, &writer);

    let first = engine.run(&ModelCatalog).await.expect("First run failed");
    let second = engine.run(&ModelCatalog).await.expect("Second run failed");

    assert_eq!(first.details_fetched, 2);
    assert_eq!(second.details_fetched, 2);
    assert_eq!(second.items_skipped, 0);
    assert_eq!(writer.count_rows(&writer.tables().model).await.unwrap(), 2);

    let requests = mock_server.received_requests().await.unwrap();
    let raw_queries: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == "/api/model")
        .filter_map(|r| r.url.query().map(str::to_string))
        .collect();
    assert_eq!(
        raw_queries[0],
        "name=Anna%20B&order=DATE&direction=DESC"
    );

    let (chest, waist, hip, debut): (String, String, Option<String>, String) = writer
        .store()
        .provider()
        .with_connection(|conn| {
            conn.query_row(
                "SELECT chest_size, waist_size, hip_size, debut_month FROM metart_model WHERE uuid = 'm-zoe'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
        })
        .unwrap();
    assert_eq!(chest, "32");
    assert_eq!(waist, "23");
    assert_eq!(hip, None);
    assert_eq!(debut, "1998-03-01");
}

#[tokio::test]
async fn test_missing_detail_field_stops_ingest() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "models": [{"UUID": "m-1", "name": "Anna"}]
        })))
        .mount(&mock_server)
        .await;

    let mut detail = model_detail("m-1", "Anna", "34/24/35");
    detail.as_object_mut().unwrap().remove("size");

    Mock::given(method("GET"))
        .and(path("/api/model"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let writer = create_writer(&dir).await;
    let client = create_client(&mock_server);

    let result = Engine::new(&client, &writer).run(&ModelCatalog).await;

    assert!(matches!(result, Err(IngestError::MissingField { ref field, .. }) if field == "size"));
    assert_eq!(writer.count_rows(&writer.tables().model).await.unwrap(), 0);
}

#[tokio::test]
async fn test_error_status_body_is_still_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"total": 0, "models": []})))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.list_count(Kind::Model).await.unwrap(), 0);

    let bad_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&bad_server)
        .await;

    let bad_client = create_client(&bad_server);
    let result = bad_client.list_count(Kind::Model).await;
    assert!(matches!(result, Err(IngestError::Decode { .. })));
}

#[tokio::test]
async fn test_bounded_retry_surfaces_transport_error() {
    let http = build_http_client(&ApiConfig::default(), false).unwrap();
    // Nothing listens on port 1
    let client = SourceClient::new(
        http,
        "http://127.0.0.1:1",
        RetryPolicy::fixed(Duration::from_millis(5)).with_max_attempts(2),
    );

    let result = client.list_count(Kind::Gallery).await;
    assert!(matches!(result, Err(IngestError::Transport { attempts: 2, .. })));
}

#[tokio::test]
async fn test_ingest_from_credentials() {
    let mock_server = MockServer::start().await;
    mount_gallery_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store").join("mirror.sqlite3");
    let credentials = parse_toml(&format!(
        r#"
[mysql]
host = "localhost"
username = "ingest"
password = ""

[store]
backend = "sqlite"
path = "{}"

[api]
base-url = "{}"

[retry]
max-attempts = 2
delay-secs = 0
"#,
        store.display(),
        mock_server.uri()
    ))
    .unwrap();

    let stats = ingest(&GalleryCatalog, &credentials, "metart", false)
        .await
        .expect("Ingest failed");

    assert_eq!(stats.details_fetched, 3);
    assert!(store.exists());
}

#[tokio::test]
async fn test_ingest_writes_to_configured_mysql_server() {
    let mock_server = MockServer::start().await;
    mount_gallery_site(&mock_server, 0).await;

    // Nothing listens on port 1
    let credentials = parse_toml(&format!(
        r#"
[mysql]
host = "127.0.0.1"
port = 1
username = "ingest"
password = "secret"
connect-timeout-secs = 1

[api]
base-url = "{}"
"#,
        mock_server.uri()
    ))
    .unwrap();

    let result = ingest(&GalleryCatalog, &credentials, "metart", false).await;

    assert!(matches!(result, Err(IngestError::MySql(_))));
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}
