use super::common;

use common::test_server::{sheets_node_type, slack_node_type, Backend, TestServer};
use pumpflux::adapters::HttpClient;
use pumpflux::domain::{FieldDefinition, FieldType, NodeTypeApi, NodeTypeDefinition, Service};
use pumpflux::ApiError;
use serde_json::json;
use std::sync::Mutex;

async fn start() -> (TestServer, HttpClient) {
    let server = TestServer::with_backend(Backend {
        node_types: Mutex::new(vec![sheets_node_type()]),
        node_bindings: Mutex::new(vec![slack_node_type()]),
        ..Default::default()
    })
    .await;
    let client = HttpClient::new(&server.settings().api).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_list_and_get() {
    let (_server, client) = start().await;

    let definitions = client.list_node_types().await.unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].service, Some(Service::GoogleSheets));
    assert_eq!(
        definitions[0].field("sheet_name").and_then(|f| f.default_value.clone()),
        Some(json!("Sheet1"))
    );

    let definition = client.get_node_type(1).await.unwrap();
    assert_eq!(definition.name, "Google Sheets trigger");

    assert!(matches!(client.get_node_type(9).await, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_lookup_by_node_id() {
    let (_server, client) = start().await;

    let bound = client.get_node_type_for_node("post").await.unwrap().unwrap();
    assert_eq!(bound.node_id.as_deref(), Some("post"));
    assert_eq!(bound.fields.len(), 2);

    assert_eq!(client.get_node_type_for_node("nobody").await.unwrap(), None);
}

#[tokio::test]
async fn test_create_update_delete() {
    let (server, client) = start().await;

    let definition = NodeTypeDefinition {
        name: "Webhook".to_string(),
        service: Some(Service::Webhook),
        fields: vec![FieldDefinition {
            name: "path".to_string(),
            label: "Path".to_string(),
            field_type: FieldType::Text,
            required: true,
            ..Default::default()
        }],
        ..Default::default()
    };

    let created = client.create_node_type(&definition).await.unwrap();
    let id = created.id.unwrap();
    assert_eq!(created.name, "Webhook");
    assert_eq!(server.backend.node_types.lock().unwrap()[1]["service"], json!("webhook"));

    let mut renamed = created.clone();
    renamed.name = "Incoming webhook".to_string();
    let updated = client.update_node_type(id, &renamed).await.unwrap();
    assert_eq!(updated.name, "Incoming webhook");

    client.delete_node_type(id).await.unwrap();
    assert_eq!(client.list_node_types().await.unwrap().len(), 1);
    assert!(matches!(client.delete_node_type(id).await, Err(ApiError::NotFound(_))));
}
