//! `reqwest` implementation of the REST ports.

use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

use crate::catalog::{parse_template_list, TemplateQuery};
use crate::config::{ApiSettings, RetrySettings};
use crate::domain::{
    parse_node_type_list, NewWorkflow, NodeTypeApi, NodeTypeDefinition, TemplateApi, Workflow,
    WorkflowApi, WorkflowTemplate,
};
use crate::error::ApiError;

pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetrySettings,
}

impl HttpClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry: settings.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-success statuses to errors. `what` names the entity for 404s.
    async fn check(response: Response, what: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), body, what))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        let response = Self::check(response, what).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_json<B, T>(
        &self,
        request: reqwest::RequestBuilder,
        body: &B,
        what: &str,
    ) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = request.json(body).send().await?;
        let response = Self::check(response, what).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn backoff_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.retry.initial_interval(),
            current_interval: self.retry.initial_interval(),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }
}

#[async_trait]
impl TemplateApi for HttpClient {
    async fn list_templates(&self, query: &TemplateQuery) -> Result<Vec<WorkflowTemplate>, ApiError> {
        let path = format!("/api/workflow/templates{}", query.to_query_string());
        let max_attempts = self.retry.max_attempts.max(1);
        let attempts = AtomicU32::new(0);

        let payload: Value = retry(self.backoff_policy(), || async {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match self.get_json::<Value>(&path, "template list").await {
                Ok(payload) => Ok(payload),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, max_attempts, "Template list fetch failed, retrying: {}", e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await?;

        let templates = parse_template_list(payload);
        info!(count = templates.len(), "Loaded templates");
        Ok(templates)
    }

    async fn get_template(&self, id: i64) -> Result<WorkflowTemplate, ApiError> {
        self.get_json(&format!("/api/workflow/templates/{}", id), &format!("template {}", id))
            .await
    }
}

#[async_trait]
impl NodeTypeApi for HttpClient {
    async fn list_node_types(&self) -> Result<Vec<NodeTypeDefinition>, ApiError> {
        let payload: Value = self.get_json("/api/workflow/node-types", "node types").await?;
        let definitions = parse_node_type_list(payload);
        info!(count = definitions.len(), "Loaded node types");
        Ok(definitions)
    }

    async fn get_node_type(&self, id: i64) -> Result<NodeTypeDefinition, ApiError> {
        self.get_json(&format!("/api/workflow/node-types/{}", id), &format!("node type {}", id))
            .await
    }

    async fn get_node_type_for_node(
        &self,
        node_id: &str,
    ) -> Result<Option<NodeTypeDefinition>, ApiError> {
        let path = format!("/api/node-types/by-node-id/{}", urlencoding::encode(node_id));
        match self.get_json(&path, node_id).await {
            Ok(definition) => Ok(Some(definition)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_node_type(
        &self,
        definition: &NodeTypeDefinition,
    ) -> Result<NodeTypeDefinition, ApiError> {
        let created: NodeTypeDefinition = self
            .send_json(self.client.post(self.url("/api/node-types")), definition, "node types")
            .await?;
        info!(node_type = %created.name, "Created node type");
        Ok(created)
    }

    async fn update_node_type(
        &self,
        id: i64,
        definition: &NodeTypeDefinition,
    ) -> Result<NodeTypeDefinition, ApiError> {
        let request = self.client.put(self.url(&format!("/api/node-types/{}", id)));
        self.send_json(request, definition, &format!("node type {}", id))
            .await
    }

    async fn delete_node_type(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/node-types/{}", id)))
            .send()
            .await?;
        Self::check(response, &format!("node type {}", id)).await?;
        info!(id, "Deleted node type");
        Ok(())
    }
}

#[async_trait]
impl WorkflowApi for HttpClient {
    async fn create_workflow(&self, workflow: &NewWorkflow) -> Result<Workflow, ApiError> {
        self.send_json(self.client.post(self.url("/api/workflows")), workflow, "workflows")
            .await
    }
}
