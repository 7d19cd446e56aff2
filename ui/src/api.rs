//! API client for the PumpFlux backend

use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::future::TimeoutFuture;
use pumpflux::catalog::{parse_template_list, TemplateQuery};
use pumpflux::domain::{
    parse_node_type_list, NewWorkflow, NodeTypeDefinition, Workflow, WorkflowTemplate,
};
use pumpflux::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const API_BASE: &str = "/api";

/// Attempts for the template list before giving up
const LIST_ATTEMPTS: u32 = 3;
const LIST_RETRY_DELAY_MS: u32 = 200;

/// Fetch templates. Connection failures, 5xx and 429 are retried with a
/// doubling delay; a payload that is not an array shows as an empty catalog.
pub async fn list_templates(query: &TemplateQuery) -> Result<Vec<WorkflowTemplate>, ApiError> {
    let url = format!("{}/workflow/templates{}", API_BASE, query.to_query_string());
    let mut delay = LIST_RETRY_DELAY_MS;
    let mut attempt = 1;
    loop {
        match fetch_json::<Value>(&url, "template list").await {
            Ok(payload) => return Ok(parse_template_list(payload)),
            Err(e) if e.is_retryable() && attempt < LIST_ATTEMPTS => {
                log::warn!("Template list attempt {} failed: {}", attempt, e);
                TimeoutFuture::new(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn get_template(id: i64) -> Result<WorkflowTemplate, ApiError> {
    let url = format!("{}/workflow/templates/{}", API_BASE, id);
    fetch_json(&url, &format!("template {}", id)).await
}

/// Published definitions. Entries that do not decode are skipped.
pub async fn list_node_types() -> Result<Vec<NodeTypeDefinition>, ApiError> {
    let url = format!("{}/workflow/node-types", API_BASE);
    let payload = fetch_json::<Value>(&url, "node types").await?;
    Ok(parse_node_type_list(payload))
}

/// Definition bound to a template node, `None` when there is none.
pub async fn get_node_type_for_node(node_id: &str) -> Result<Option<NodeTypeDefinition>, ApiError> {
    let url = format!(
        "{}/node-types/by-node-id/{}",
        API_BASE,
        urlencoding::encode(node_id)
    );
    match fetch_json(&url, node_id).await {
        Ok(definition) => Ok(Some(definition)),
        Err(ApiError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn create_node_type(definition: &NodeTypeDefinition) -> Result<NodeTypeDefinition, ApiError> {
    let url = format!("{}/node-types", API_BASE);
    send_json(Request::post(&url), definition, "node type").await
}

pub async fn update_node_type(
    id: i64,
    definition: &NodeTypeDefinition,
) -> Result<NodeTypeDefinition, ApiError> {
    let url = format!("{}/node-types/{}", API_BASE, id);
    send_json(Request::put(&url), definition, &format!("node type {}", id)).await
}

pub async fn delete_node_type(id: i64) -> Result<(), ApiError> {
    let url = format!("{}/node-types/{}", API_BASE, id);
    let response = send(Request::delete(&url)).await?;
    check_status(response, &format!("node type {}", id)).await.map(|_| ())
}

pub async fn create_workflow(workflow: &NewWorkflow) -> Result<Workflow, ApiError> {
    let url = format!("{}/workflows", API_BASE);
    send_json(Request::post(&url), workflow, "workflow").await
}

async fn fetch_json<T: DeserializeOwned>(url: &str, what: &str) -> Result<T, ApiError> {
    read_json(send(Request::get(url)).await?, what).await
}

async fn send_json<B: Serialize, T: DeserializeOwned>(
    builder: RequestBuilder,
    body: &B,
    what: &str,
) -> Result<T, ApiError> {
    let request = builder
        .json(body)
        .map_err(|e| ApiError::Decode(format!("Failed to serialize body: {}", e)))?;
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;
    read_json(response, what).await
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    builder
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))
}

async fn check_status(response: Response, what: &str) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status, body, what))
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
    check_status(response, what)
        .await?
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
