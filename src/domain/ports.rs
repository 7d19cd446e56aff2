//! REST seams the client depends on. The native adapter lives in
//! `adapters::http_client`; the browser UI talks to the same endpoints
//! through `gloo-net`.

use async_trait::async_trait;

use super::{NewWorkflow, NodeTypeDefinition, Workflow, WorkflowTemplate};
use crate::catalog::TemplateQuery;
use crate::error::ApiError;

#[async_trait]
pub trait TemplateApi: Send + Sync {
    /// `GET /api/workflow/templates`. A payload that is not an array yields an empty list.
    async fn list_templates(&self, query: &TemplateQuery) -> Result<Vec<WorkflowTemplate>, ApiError>;

    /// `GET /api/workflow/templates/:id`
    async fn get_template(&self, id: i64) -> Result<WorkflowTemplate, ApiError>;
}

#[async_trait]
pub trait NodeTypeApi: Send + Sync {
    async fn list_node_types(&self) -> Result<Vec<NodeTypeDefinition>, ApiError>;

    async fn get_node_type(&self, id: i64) -> Result<NodeTypeDefinition, ApiError>;

    /// `GET /api/node-types/by-node-id/:nodeId`, `None` when no definition is bound.
    async fn get_node_type_for_node(
        &self,
        node_id: &str,
    ) -> Result<Option<NodeTypeDefinition>, ApiError>;

    async fn create_node_type(
        &self,
        definition: &NodeTypeDefinition,
    ) -> Result<NodeTypeDefinition, ApiError>;

    async fn update_node_type(
        &self,
        id: i64,
        definition: &NodeTypeDefinition,
    ) -> Result<NodeTypeDefinition, ApiError>;

    async fn delete_node_type(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn create_workflow(&self, workflow: &NewWorkflow) -> Result<Workflow, ApiError>;
}
