//! Fetch and execute against a local mock API

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use endpoint_parser::HttpMethod;
use explorer_client::{Explorer, RequestExecutor};
use explorer_core::{EndpointKey, RequestDraft, Settings};

fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Mock API", "version": "1.0.0"},
        "paths": {
            "/items/{id}": {
                "get": {
                    "summary": "Get item",
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "verbose", "in": "query", "schema": {"type": "boolean"}}
                    ],
                    "responses": {"200": {"description": "OK"}}
                }
            },
            "/echo": {
                "post": {
                    "summary": "Echo body",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {"schema": {"$ref": "#/components/schemas/Note"}}
                        }
                    },
                    "responses": {"201": {"description": "Created"}}
                }
            },
            "/inspect": {
                "get": {
                    "summary": "Body length",
                    "responses": {"200": {"description": "OK"}}
                }
            },
            "/garbled": {
                "get": {
                    "summary": "Broken JSON",
                    "responses": {"200": {"description": "OK"}}
                }
            }
        },
        "components": {
            "schemas": {
                "Note": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "done": {"type": "boolean"}
                    }
                }
            }
        }
    })
}

async fn get_item(Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    let trace = headers
        .get("x-trace")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    Json(json!({"id": id, "trace": trace}))
}

async fn echo(body: String) -> impl IntoResponse {
    (StatusCode::CREATED, [("x-echo", "yes")], body)
}

async fn inspect(body: String) -> String {
    body.len().to_string()
}

async fn garbled() -> impl IntoResponse {
    ([("content-type", "application/json")], "{ not json")
}

async fn broken_document() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/openapi.json", get(|| async { Json(document()) }))
        .route("/items/:id", get(get_item))
        .route("/echo", post(echo))
        .route("/inspect", get(inspect))
        .route("/garbled", get(garbled))
        .route("/broken/openapi.json", get(broken_document));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_loads_endpoints_from_live_document() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();

    let (normalized, count) = explorer.add_base_url(&format!("{}/", base_url)).await.unwrap();
    assert_eq!(normalized, base_url);
    assert_eq!(count, 4);

    let endpoints = explorer.store().endpoints_for(&base_url).await;
    let ids: Vec<&str> = endpoints.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["get-/items/{id}", "post-/echo", "get-/inspect", "get-/garbled"]);

    let echo = explorer.store().find_by_id(&base_url, "post-/echo").await.unwrap();
    let body = echo.request_body.unwrap();
    assert!(body.required);
    assert_eq!(body.content_type, "application/json");
    assert!(body.schema.unwrap().is_resolved());
}

#[tokio::test]
async fn test_failing_document_yields_no_endpoints() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();

    let (_, count) = explorer
        .add_base_url(&format!("{}/broken", base_url))
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(explorer.store().list_endpoints().await.is_empty());
}

#[tokio::test]
async fn test_get_with_path_param_and_header() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();
    explorer.add_base_url(&base_url).await.unwrap();

    let key = EndpointKey {
        base_url: base_url.clone(),
        method: HttpMethod::Get,
        path: "/items/{id}".to_string(),
    };
    let mut draft = explorer.select(&key).await.unwrap();
    assert_eq!(draft.path_params["id"], "");
    assert!(draft.query_params.is_empty());

    draft.set_path_param("id", "42");
    draft.set_header("X-Trace", "t-1");

    let endpoint = explorer.store().get_selected().await.unwrap();
    let record = explorer.send(&endpoint, &draft).await;

    assert_eq!(record.status, 200);
    assert_eq!(record.status_text, "OK");
    assert!(record.headers["content-type"].contains("application/json"));
    assert_eq!(record.data, json!({"id": "42", "trace": "t-1"}));
    assert!(record.error.is_none());

    assert_eq!(explorer.last_response(&key).await, Some(record));
}

#[tokio::test]
async fn test_post_sends_sample_body_and_captures_text() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();
    explorer.add_base_url(&base_url).await.unwrap();

    let endpoint = explorer.store().find_by_id(&base_url, "post-/echo").await.unwrap();
    let draft = explorer.new_draft(&endpoint);
    assert_eq!(draft.body, "{\n  \"title\": \"sample string\",\n  \"done\": true\n}");

    let record = explorer.send(&endpoint, &draft).await;

    assert_eq!(record.status, 201);
    assert_eq!(record.status_text, "Created");
    assert_eq!(record.headers["x-echo"], "yes");
    assert_eq!(record.data, Value::String(draft.body.clone()));
}

#[tokio::test]
async fn test_get_drops_draft_body() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();
    explorer.add_base_url(&base_url).await.unwrap();

    let endpoint = explorer.store().find_by_id(&base_url, "get-/inspect").await.unwrap();
    let mut draft = explorer.new_draft(&endpoint);
    draft.set_body("{\"ignored\": true}");

    let record = explorer.send(&endpoint, &draft).await;
    assert_eq!(record.status, 200);
    assert_eq!(record.data, Value::String("0".to_string()));
}

#[tokio::test]
async fn test_invalid_json_response_is_an_error_record() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();
    explorer.add_base_url(&base_url).await.unwrap();

    let endpoint = explorer.store().find_by_id(&base_url, "get-/garbled").await.unwrap();
    let record = explorer.send(&endpoint, &explorer.new_draft(&endpoint)).await;

    assert_eq!(record.status, 0);
    assert_eq!(record.status_text, "Error");
    assert!(record.error.is_some());
}

#[tokio::test]
async fn test_send_to_other_base_url() {
    let base_url = spawn_server().await;
    let other = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();
    explorer.add_base_url(&base_url).await.unwrap();

    let endpoint = explorer
        .store()
        .find_by_id(&base_url, "get-/items/{id}")
        .await
        .unwrap();
    let mut draft = explorer.new_draft(&endpoint);
    draft.set_path_param("id", "a b");

    let record = explorer.send_to(&other, &endpoint, &draft).await;
    assert_eq!(record.status, 200);
    assert_eq!(record.data["id"], "a b");
}

#[tokio::test]
async fn test_refresh_all_reloads_every_base_url() {
    let first = spawn_server().await;
    let second = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();

    explorer.store().add_base_url(&first).await.unwrap();
    explorer.store().add_base_url(&second).await.unwrap();

    assert_eq!(explorer.refresh_all().await, 8);
    assert_eq!(explorer.store().search("echo").await.len(), 2);

    explorer.remove_base_url(&second).await.unwrap();
    assert_eq!(explorer.store().list_endpoints().await.len(), 4);
}

#[tokio::test]
async fn test_refresh_of_removed_base_url_stores_nothing() {
    let base_url = spawn_server().await;
    let explorer = Explorer::new(Settings::default()).unwrap();

    explorer.add_base_url(&base_url).await.unwrap();
    explorer.remove_base_url(&base_url).await.unwrap();

    assert_eq!(explorer.refresh(&base_url).await, 0);
    assert!(explorer.store().list_endpoints().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_an_error_record() {
    let executor = RequestExecutor::new(None).unwrap();
    let explorer = Explorer::with_executor(Settings::default(), executor);

    let base_url = spawn_server().await;
    explorer.add_base_url(&base_url).await.unwrap();
    let endpoint = explorer.store().find_by_id(&base_url, "get-/inspect").await.unwrap();

    let record = explorer
        .send_to("http://127.0.0.1:1", &endpoint, &RequestDraft::default())
        .await;

    assert_eq!(record.status, 0);
    assert_eq!(record.status_text, "Error");
    assert!(record.headers.is_empty());
    assert_eq!(record.data, Value::Null);
    assert!(record.error.is_some());
}
