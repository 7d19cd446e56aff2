//! In-process fake of the PumpFlux REST backend.

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pumpflux::config::Settings;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Backend {
    pub templates: Mutex<Vec<Value>>,
    /// Served instead of `templates` on the list endpoint when set
    pub template_list_override: Mutex<Option<Value>>,
    pub node_types: Mutex<Vec<Value>>,
    /// Definitions reachable only through the by-node-id endpoint
    pub node_bindings: Mutex<Vec<Value>>,
    pub workflows: Mutex<Vec<Value>>,
    /// Number of upcoming template list requests that answer 503
    pub list_failures: AtomicU32,
    pub list_requests: AtomicU32,
    pub last_list_query: Mutex<Option<String>>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub backend: Arc<Backend>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_backend(Backend::default()).await
    }

    pub async fn with_backend(backend: Backend) -> Self {
        let backend = Arc::new(backend);

        let app = Router::new()
            .route("/api/workflow/templates", get(list_templates))
            .route("/api/workflow/templates/:id", get(get_template))
            .route("/api/workflow/node-types", get(list_node_types))
            .route("/api/workflow/node-types/:id", get(get_node_type))
            .route("/api/node-types/by-node-id/:node_id", get(node_type_for_node))
            .route("/api/node-types", axum::routing::post(create_node_type))
            .route(
                "/api/node-types/:id",
                axum::routing::put(update_node_type).delete(delete_node_type),
            )
            .route("/api/workflows", axum::routing::post(create_workflow))
            .with_state(backend.clone());

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            base_url,
            backend,
        }
    }

    /// Client settings pointing at this server, with fast retries.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = self.base_url.clone();
        settings.api.timeout_secs = 5;
        settings.api.retry.initial_interval_ms = 5;
        settings
    }
}

type Shared = State<Arc<Backend>>;

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{} not found", what) }))).into_response()
}

fn find_by_id(items: &[Value], id: i64) -> Option<Value> {
    items.iter().find(|item| item["id"] == json!(id)).cloned()
}

async fn list_templates(State(backend): Shared, RawQuery(query): RawQuery) -> Response {
    backend.list_requests.fetch_add(1, Ordering::SeqCst);
    *backend.last_list_query.lock().unwrap() = query;

    let remaining = backend.list_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        backend.list_failures.store(remaining - 1, Ordering::SeqCst);
        return (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response();
    }

    if let Some(payload) = backend.template_list_override.lock().unwrap().clone() {
        return Json(payload).into_response();
    }
    Json(Value::Array(backend.templates.lock().unwrap().clone())).into_response()
}

async fn get_template(State(backend): Shared, Path(id): Path<i64>) -> Response {
    match find_by_id(&backend.templates.lock().unwrap(), id) {
        Some(template) => Json(template).into_response(),
        None => not_found("template"),
    }
}

async fn list_node_types(State(backend): Shared) -> Json<Value> {
    Json(Value::Array(backend.node_types.lock().unwrap().clone()))
}

async fn get_node_type(State(backend): Shared, Path(id): Path<i64>) -> Response {
    match find_by_id(&backend.node_types.lock().unwrap(), id) {
        Some(definition) => Json(definition).into_response(),
        None => not_found("node type"),
    }
}

async fn node_type_for_node(State(backend): Shared, Path(node_id): Path<String>) -> Response {
    let node_types = backend.node_types.lock().unwrap();
    let bindings = backend.node_bindings.lock().unwrap();
    match node_types
        .iter()
        .chain(bindings.iter())
        .find(|d| d["nodeId"] == json!(node_id))
    {
        Some(definition) => Json(definition.clone()).into_response(),
        None => not_found("node type"),
    }
}

async fn create_node_type(State(backend): Shared, Json(mut definition): Json<Value>) -> Response {
    let mut node_types = backend.node_types.lock().unwrap();
    definition["id"] = json!(node_types.len() as i64 + 1);
    node_types.push(definition.clone());
    (StatusCode::CREATED, Json(definition)).into_response()
}

async fn update_node_type(
    State(backend): Shared,
    Path(id): Path<i64>,
    Json(mut definition): Json<Value>,
) -> Response {
    let mut node_types = backend.node_types.lock().unwrap();
    match node_types.iter_mut().find(|d| d["id"] == json!(id)) {
        Some(slot) => {
            definition["id"] = json!(id);
            *slot = definition.clone();
            Json(definition).into_response()
        }
        None => not_found("node type"),
    }
}

async fn delete_node_type(State(backend): Shared, Path(id): Path<i64>) -> Response {
    let mut node_types = backend.node_types.lock().unwrap();
    let before = node_types.len();
    node_types.retain(|d| d["id"] != json!(id));
    if node_types.len() == before {
        return not_found("node type");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_workflow(State(backend): Shared, Json(payload): Json<Value>) -> Response {
    if payload["name"].as_str().map_or(true, |n| n.trim().is_empty()) {
        return (StatusCode::BAD_REQUEST, "name is required").into_response();
    }
    let mut workflows = backend.workflows.lock().unwrap();
    let mut workflow = payload;
    workflow["id"] = json!(workflows.len() as i64 + 100);
    workflows.push(workflow.clone());
    (StatusCode::CREATED, Json(workflow)).into_response()
}

/// Two-node "Sheets to Slack" template with a spreadsheet placeholder.
pub fn sheets_to_slack(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Sheets to Slack",
        "description": "Post new spreadsheet rows to a channel",
        "category": "productivity",
        "tags": ["sheets", "slack"],
        "difficulty": "beginner",
        "createdAt": "2024-03-01T10:00:00Z",
        "workflowData": {
            "nodes": [
                {
                    "id": "sheet",
                    "type": "trigger",
                    "position": { "x": 0.0, "y": 0.0 },
                    "data": {
                        "label": "New row",
                        "service": "google-sheets",
                        "event": "new_row",
                        "config": { "spreadsheet_id": "${spreadsheet_id}", "sheet_name": "Sheet1" }
                    }
                },
                {
                    "id": "post",
                    "type": "action",
                    "position": { "x": 200.0, "y": 0.0 },
                    "data": {
                        "label": "Post message",
                        "service": "slack",
                        "action": "send_message",
                        "config": { "token": "{{slack_token}}" }
                    }
                }
            ],
            "edges": [{ "id": "e1", "source": "sheet", "target": "post" }]
        }
    })
}

/// Template whose graph is stored as a JSON string, as older rows are.
pub fn digest_template(id: i64) -> Value {
    let graph = json!({
        "nodes": [{
            "id": "cron",
            "type": "trigger",
            "data": { "label": "Every morning", "service": "schedule", "config": { "cron": "0 8 * * *" } }
        }],
        "edges": []
    });
    json!({
        "id": id,
        "name": "Daily digest",
        "description": "Email a summary every morning",
        "category": "communication",
        "tags": ["email"],
        "complexity": "intermediate",
        "createdAt": "2024-05-01T10:00:00Z",
        "workflowData": graph.to_string()
    })
}

pub fn sheets_node_type() -> Value {
    json!({
        "id": 1,
        "name": "Google Sheets trigger",
        "service": "google-sheets",
        "fields": [
            { "name": "spreadsheet_id", "label": "Spreadsheet", "type": "text", "required": true },
            { "name": "sheet_name", "label": "Sheet", "type": "text", "defaultValue": "Sheet1" }
        ]
    })
}

/// Definition bound to the "post" node by id.
pub fn slack_node_type() -> Value {
    json!({
        "id": 2,
        "nodeId": "post",
        "name": "Slack message",
        "service": "slack",
        "fields": [
            {
                "name": "channel",
                "label": "Channel",
                "type": "text",
                "required": true,
                "validation": [{ "rule": "pattern", "value": "#[a-z0-9-]+", "message": "Use a #channel name" }]
            },
            { "name": "notify", "label": "Notify", "type": "boolean" }
        ]
    })
}
