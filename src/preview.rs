//! Read-only summary of a template shown before setup.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::domain::{Service, WorkflowTemplate};
use crate::resolver::extract_placeholders;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: String,
    pub label: String,
    pub node_type: String,
    pub service: Option<Service>,
    /// Trigger event or action name, whichever the node declares.
    pub operation: Option<String>,
    pub config_keys: usize,
    /// Required config keys of the node's service that are blank.
    pub missing_config: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSummary {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreview {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub level: Option<String>,
    pub tags: Vec<String>,
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<EdgeSummary>,
    pub placeholders: Vec<String>,
}

impl TemplatePreview {
    pub fn from_template(template: &WorkflowTemplate) -> Self {
        let graph = &template.workflow_data;
        let labels: HashMap<&str, &str> = graph
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.label()))
            .collect();
        let label_of = |id: &str| labels.get(id).copied().unwrap_or(id).to_string();

        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeSummary {
                id: node.id.clone(),
                label: node.label().to_string(),
                node_type: node.node_type.clone(),
                service: node.data.service.clone(),
                operation: node.data.event.clone().or_else(|| node.data.action.clone()),
                config_keys: node.config().len(),
                missing_config: node.missing_required_config(),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeSummary {
                id: edge.id.clone(),
                from: label_of(&edge.source),
                to: label_of(&edge.target),
                label: edge.label.clone(),
            })
            .collect();

        Self {
            id: template.id,
            name: template.name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            level: template.level().map(str::to_string),
            tags: template.tags.clone(),
            nodes,
            edges,
            placeholders: extract_placeholders(&graph.nodes),
        }
    }

    /// Pretty-printed `[{ "id", "label", "config" }]`, one entry per node in
    /// graph order. Labels are not unique, so nodes are listed rather than keyed.
    pub fn config_dump(template: &WorkflowTemplate) -> String {
        let dump: Vec<Value> = template
            .workflow_data
            .nodes
            .iter()
            .map(|n| json!({ "id": n.id, "label": n.label(), "config": n.config() }))
            .collect();
        serde_json::to_string_pretty(&dump).unwrap_or_default()
    }

    pub fn needs_credentials(&self) -> bool {
        !self.placeholders.is_empty()
    }
}
