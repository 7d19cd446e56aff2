use super::common;

use common::test_server::{digest_template, sheets_to_slack, Backend, TestServer};
use pumpflux::adapters::HttpClient;
use pumpflux::catalog::{visible_templates, TemplateFilter, TemplateQuery, TemplateSort};
use pumpflux::domain::TemplateApi;
use pumpflux::ApiError;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

fn backend_with_templates() -> Backend {
    Backend {
        templates: Mutex::new(vec![sheets_to_slack(1), digest_template(2)]),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_list_templates() {
    let server = TestServer::with_backend(backend_with_templates()).await;
    let client = HttpClient::new(&server.settings().api).unwrap();

    let templates = client.list_templates(&TemplateQuery::default()).await.unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].workflow_data.nodes.len(), 2);
    // graph stored as a JSON string is decoded too
    assert_eq!(templates[1].workflow_data.nodes[0].label(), "Every morning");
}

#[tokio::test]
async fn test_query_is_forwarded_and_filters_reapplied() {
    let server = TestServer::with_backend(backend_with_templates()).await;
    let client = HttpClient::new(&server.settings().api).unwrap();

    // the fake backend ignores the query, so filtering must happen client-side
    let filter = TemplateFilter {
        search: Some("daily digest".to_string()),
        ..Default::default()
    };
    let query = TemplateQuery::from_filter(&filter, TemplateSort::Newest);
    let templates = client.list_templates(&query).await.unwrap();
    assert_eq!(templates.len(), 2);

    assert_eq!(
        server.backend.last_list_query.lock().unwrap().as_deref(),
        Some("search=daily%20digest&sort=newest")
    );

    let visible = visible_templates(&templates, &filter, TemplateSort::Newest, &BTreeSet::new());
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Daily digest");
}

#[tokio::test]
async fn test_non_array_payload_is_empty_catalog() {
    let backend = backend_with_templates();
    *backend.template_list_override.lock().unwrap() = Some(json!({ "error": "database offline" }));
    let server = TestServer::with_backend(backend).await;
    let client = HttpClient::new(&server.settings().api).unwrap();

    let templates = client.list_templates(&TemplateQuery::default()).await.unwrap();
    assert!(templates.is_empty());
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let backend = backend_with_templates();
    backend.list_failures.store(2, Ordering::SeqCst);
    let server = TestServer::with_backend(backend).await;
    let client = HttpClient::new(&server.settings().api).unwrap();

    let templates = client.list_templates(&TemplateQuery::default()).await.unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(server.backend.list_requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_stop_after_max_attempts() {
    let backend = backend_with_templates();
    backend.list_failures.store(10, Ordering::SeqCst);
    let server = TestServer::with_backend(backend).await;
    let client = HttpClient::new(&server.settings().api).unwrap();

    let err = client.list_templates(&TemplateQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 503, .. }));
    assert_eq!(server.backend.list_requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_get_template_and_not_found() {
    let server = TestServer::with_backend(backend_with_templates()).await;
    let client = HttpClient::new(&server.settings().api).unwrap();

    let template = client.get_template(1).await.unwrap();
    assert_eq!(template.name, "Sheets to Slack");
    assert_eq!(template.level(), Some("beginner"));

    let err = client.get_template(99).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_request_error() {
    // bind then drop a listener to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut settings = pumpflux::config::Settings::default();
    settings.api.base_url = format!("http://{}", addr);
    settings.api.retry.max_attempts = 1;
    let client = HttpClient::new(&settings.api).unwrap();

    let err = client.get_template(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}
