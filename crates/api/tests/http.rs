//! End-to-end tests over a real listener and an in-memory SQLite store

use std::sync::Arc;
use std::time::Duration;

use api::{serve, AppState};
use data_validator::{ValidationConfig, Validator};
use reqwest::StatusCode;
use serde_json::{json, Value};
use storage::SqliteStore;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    base: String,
    client: reqwest::Client,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let store = SqliteStore::in_memory().await.unwrap();
        let validator = Validator::new(ValidationConfig::default()).unwrap();
        let state = AppState::new(Arc::new(store), Arc::new(validator));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(
            listener,
            state,
            async move {
                let _ = stopped.await;
            },
            Duration::from_secs(1),
        ));

        Self {
            base,
            client: reqwest::Client::new(),
            stop: Some(stop),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_student_lifecycle() {
    let server = TestServer::start().await;
    let client = &server.client;

    let res = client
        .post(server.url("/api/students"))
        .json(&json!({"name": "Ann", "email": "ann@x.com", "age": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"id": 1}));

    let res = client
        .post(server.url("/api/students"))
        .json(&json!({"name": "Bob", "email": "bob@x.com", "age": 22}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"id": 2}));

    let res = client.get(server.url("/api/students/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Ann", "email": "ann@x.com", "age": 20})
    );

    let res = client
        .put(server.url("/api/students/1"))
        .json(&json!({"name": "Ann B", "email": "ann@x.com", "age": 21}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": "1", "rowsAffected": "1"})
    );

    let list: Value = client
        .get(server.url("/api/students"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert!(list
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["name"] == "Ann B" && s["age"] == 21));

    let res = client.delete(server.url("/api/students/2")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": "2", "rowsAffected": "1"})
    );

    let res = client.get(server.url("/api/students/2")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_email_leaves_one_row() {
    let server = TestServer::start().await;
    let client = &server.client;
    let ann = json!({"name": "Ann", "email": "ann@x.com", "age": 20});

    let first = client.post(server.url("/api/students")).json(&ann).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(server.url("/api/students")).json(&ann).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = second.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("ann@x.com"));

    let list: Value = client
        .get(server.url("/api/students"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([{"id": 1, "name": "Ann", "email": "ann@x.com", "age": 20}]));

    server.shutdown().await;
}

#[tokio::test]
async fn test_bad_requests() {
    let server = TestServer::start().await;
    let client = &server.client;

    let res = client.post(server.url("/api/students")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "empty body"}));

    let res = client
        .post(server.url("/api/students"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/api/students"))
        .json(&json!({"name": "Ann", "email": "nope", "age": -3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][1]["field"], "age");

    let res = client.get(server.url("/api/students/1x")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.shutdown().await;
}

#[tokio::test]
async fn test_welcome_page() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Welcome to students api");

    server.shutdown().await;
}
