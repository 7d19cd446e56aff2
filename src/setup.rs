//! Turning a template into a saved workflow.
//!
//! [`TemplateSetup`] holds the user's in-progress choices (workflow name,
//! credential values, wizard-configured nodes). [`SetupService`] drives it
//! against the backend.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    Edge, NewWorkflow, Node, NodeTypeApi, NodeTypeRegistry, TemplateApi, Workflow, WorkflowApi,
    WorkflowData, WorkflowTemplate,
};
use crate::error::ApiError;
use crate::navigation::{Navigator, Route};
use crate::resolver::{apply_credentials, CredentialMap};
use crate::wizard::NodeConfigWizard;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Missing credentials: {}", .0.join(", "))]
    IncompleteCredentials(Vec<String>),

    #[error("Workflow name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSetup {
    template_id: i64,
    template_name: String,
    description: String,
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    credentials: CredentialMap,
}

impl TemplateSetup {
    pub fn new(template: &WorkflowTemplate) -> Self {
        let nodes = template.workflow_data.nodes.clone();
        let credentials = CredentialMap::from_nodes(&nodes);
        Self {
            template_id: template.id,
            template_name: template.name.clone(),
            description: template.description.clone(),
            name: format!("{} (copy)", template.name),
            nodes,
            edges: template.workflow_data.edges.clone(),
            credentials,
        }
    }

    pub fn template_id(&self) -> i64 {
        self.template_id
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn credentials(&self) -> &CredentialMap {
        &self.credentials
    }

    /// Returns `false` if the template has no placeholder called `name`.
    pub fn set_credential(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.credentials.set(name, value)
    }

    /// Take the nodes as configured by the wizard. The wizard edits the raw
    /// nodes, so placeholder tokens survive and keep their entered values.
    /// Placeholders that no longer appear are dropped, new ones start blank.
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.credentials = self.credentials.rekey(&nodes);
        self.nodes = nodes;
    }

    pub fn credentials_complete(&self) -> bool {
        self.credentials.is_complete()
    }

    pub fn missing_credentials(&self) -> Vec<&str> {
        self.credentials.missing()
    }

    /// Nodes with the current credential values substituted. Only meant for
    /// saving; editing happens on [`TemplateSetup::nodes`].
    pub fn resolved_nodes(&self) -> Vec<Node> {
        apply_credentials(&self.nodes, &self.credentials)
    }

    pub fn build_workflow(&self) -> Result<NewWorkflow, SetupError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SetupError::EmptyName);
        }
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(SetupError::IncompleteCredentials(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }
        Ok(NewWorkflow {
            name: name.to_string(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            template_id: Some(self.template_id),
            workflow_data: WorkflowData {
                nodes: self.resolved_nodes(),
                edges: self.edges.clone(),
            },
        })
    }
}

pub struct SetupService<A, N> {
    api: A,
    navigator: N,
}

impl<A, N> SetupService<A, N>
where
    A: TemplateApi + NodeTypeApi + WorkflowApi,
    N: Navigator,
{
    pub fn new(api: A, navigator: N) -> Self {
        Self { api, navigator }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub async fn begin(&self, template_id: i64) -> Result<TemplateSetup, SetupError> {
        let template = self.api.get_template(template_id).await?;
        let setup = TemplateSetup::new(&template);
        info!(
            template = template_id,
            nodes = setup.nodes().len(),
            credentials = setup.credentials().len(),
            "Started template setup"
        );
        Ok(setup)
    }

    /// Wizard over the setup's nodes, placeholders still in place. Credentials
    /// are substituted when the workflow is built. Nodes the bulk listing does
    /// not cover are looked up by node id.
    pub async fn wizard_for(&self, setup: &TemplateSetup) -> Result<NodeConfigWizard, SetupError> {
        let nodes = setup.nodes().to_vec();
        let mut registry = NodeTypeRegistry::new(self.api.list_node_types().await?);
        for node in &nodes {
            if registry.find_for(node).is_some() {
                continue;
            }
            match self.api.get_node_type_for_node(&node.id).await {
                Ok(Some(definition)) => registry.insert(definition),
                Ok(None) => debug!(node = %node.id, "No node type bound to node"),
                Err(e) => warn!(node = %node.id, "Failed to fetch node type: {}", e),
            }
        }
        Ok(NodeConfigWizard::new(nodes, registry))
    }

    /// Save the workflow and navigate to it.
    pub async fn save(&self, setup: &TemplateSetup) -> Result<Workflow, SetupError> {
        let new_workflow = setup.build_workflow()?;
        let workflow = self.api.create_workflow(&new_workflow).await?;
        info!(workflow = workflow.id, template = setup.template_id(), "Saved workflow");
        self.navigator.navigate(Route::Workflow(workflow.id));
        Ok(workflow)
    }
}
