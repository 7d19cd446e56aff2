use super::common;

use common::test_server::{
    sheets_node_type, sheets_to_slack, slack_node_type, Backend, TestServer,
};
use pumpflux::adapters::HttpClient;
use pumpflux::navigation::{HistoryNavigator, Route};
use pumpflux::setup::{SetupError, SetupService};
use pumpflux::wizard::WizardStep;
use serde_json::json;
use std::sync::Mutex;

async fn start() -> TestServer {
    TestServer::with_backend(Backend {
        templates: Mutex::new(vec![sheets_to_slack(7)]),
        node_types: Mutex::new(vec![sheets_node_type()]),
        node_bindings: Mutex::new(vec![slack_node_type()]),
        ..Default::default()
    })
    .await
}

fn service(server: &TestServer) -> SetupService<HttpClient, HistoryNavigator> {
    let client = HttpClient::new(&server.settings().api).unwrap();
    SetupService::new(client, HistoryNavigator::new())
}

#[tokio::test]
async fn test_setup_saves_workflow_and_navigates() {
    let server = start().await;
    let service = service(&server);

    let mut setup = service.begin(7).await.unwrap();
    assert_eq!(setup.name(), "Sheets to Slack (copy)");
    assert_eq!(setup.missing_credentials(), vec!["slack_token", "spreadsheet_id"]);

    setup.set_credential("spreadsheet_id", "abc123");
    setup.set_credential("slack_token", "xoxb-1");

    let mut wizard = service.wizard_for(&setup).await.unwrap();
    assert!(wizard.next(), "sheet node should validate");

    // the slack definition is only reachable by node id and needs a channel
    assert!(!wizard.next());
    assert_eq!(wizard.step(), WizardStep::Step(1));
    assert_eq!(wizard.field_error("channel"), Some("Channel is required"));

    wizard.set_field("post", "channel", json!("general")).unwrap();
    assert!(!wizard.next());
    assert_eq!(wizard.field_error("channel"), Some("Use a #channel name"));

    wizard.set_field("post", "channel", json!("#ops")).unwrap();
    assert!(wizard.next());
    assert_eq!(wizard.step(), WizardStep::Review);

    let notice = wizard.submit(|nodes| {
        assert_eq!(nodes.len(), 2);
        Ok::<(), String>(())
    });
    assert!(!notice.unwrap().is_error());
    setup.replace_nodes(wizard.into_nodes());

    let workflow = service.save(&setup).await.unwrap();
    assert_eq!(workflow.name, "Sheets to Slack (copy)");
    assert_eq!(workflow.workflow_data.nodes.len(), 2);

    let saved = server.backend.workflows.lock().unwrap()[0].clone();
    assert_eq!(saved["templateId"], json!(7));
    let nodes = &saved["workflowData"]["nodes"];
    assert_eq!(
        nodes[0]["data"]["config"],
        json!({ "spreadsheet_id": "abc123", "sheet_name": "Sheet1" })
    );
    assert_eq!(nodes[1]["data"]["config"]["token"], json!("xoxb-1"));
    assert_eq!(nodes[1]["data"]["config"]["channel"], json!("#ops"));
    assert_eq!(nodes[1]["data"]["config"]["notify"], json!(false));
    assert_eq!(saved["workflowData"]["edges"][0]["source"], json!("sheet"));

    assert_eq!(service_route(&service), Some(Route::Workflow(workflow.id)));
}

fn service_route(service: &SetupService<HttpClient, HistoryNavigator>) -> Option<Route> {
    service.navigator().current()
}

#[tokio::test]
async fn test_incomplete_credentials_are_not_saved() {
    let server = start().await;
    let service = service(&server);

    let mut setup = service.begin(7).await.unwrap();
    setup.set_credential("spreadsheet_id", "abc123");

    let err = service.save(&setup).await.unwrap_err();
    assert!(matches!(err, SetupError::IncompleteCredentials(ref missing) if missing == &["slack_token"]));
    assert!(server.backend.workflows.lock().unwrap().is_empty());
    assert_eq!(service.navigator().current(), None);
}

#[tokio::test]
async fn test_unknown_template() {
    let server = start().await;
    let service = service(&server);

    let err = service.begin(404).await.unwrap_err();
    assert!(matches!(err, SetupError::Api(pumpflux::ApiError::NotFound(_))));
}
