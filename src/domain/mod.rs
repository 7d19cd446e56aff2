//! Workflow templates, nodes and edges as served by the PumpFlux backend.
//!
//! Wire names are camelCase. Templates are read-only source data; the only
//! thing the client ever writes back is a [`NewWorkflow`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub mod node_type;
pub mod ports;
pub mod service;

pub use node_type::{
    parse_node_type_list, FieldDefinition, FieldOption, FieldType, NodeTypeDefinition,
    NodeTypeRegistry, ValidationRule,
};
pub use ports::{NodeTypeApi, TemplateApi, WorkflowApi};
pub use service::Service;

/// A node's free-form configuration object.
pub type ConfigMap = Map<String, Value>;

/// Predefined node/edge graph that users clone into a new workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient_workflow_data")]
    pub workflow_data: WorkflowData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkflowTemplate {
    /// Difficulty label, falling back to complexity. Templates carry one or the other.
    pub fn level(&self) -> Option<&str> {
        self.difficulty
            .as_deref()
            .or(self.complexity.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<Edge>,
}

impl WorkflowData {
    /// Parse the stored graph. Templates store it either inline or as a
    /// JSON-encoded string; anything malformed becomes an empty graph.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(inner @ Value::Object(_)) => Self::from_object(inner),
                Ok(_) => {
                    warn!("Workflow data string does not hold an object, using empty graph");
                    Self::default()
                }
                Err(e) => {
                    warn!("Failed to parse workflow data string: {}", e);
                    Self::default()
                }
            },
            object @ Value::Object(_) => Self::from_object(object),
            other => {
                warn!("Unexpected workflow data of type {}, using empty graph", json_kind(&other));
                Self::default()
            }
        }
    }

    fn from_object(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Malformed workflow data: {}", e);
            Self::default()
        })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn lenient_workflow_data<'de, D>(deserializer: D) -> Result<WorkflowData, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.map(WorkflowData::from_value).unwrap_or_default())
}

/// Nullable database columns arrive as `null`; treat them like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A single step in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub node_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: Position,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: NodeData,
}

impl Node {
    pub fn label(&self) -> &str {
        if self.data.label.is_empty() {
            &self.id
        } else {
            &self.data.label
        }
    }

    pub fn config(&self) -> &ConfigMap {
        &self.data.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigMap {
        &mut self.data.config
    }

    /// Keys the node's service requires that are absent or blank in its config.
    pub fn missing_required_config(&self) -> Vec<&'static str> {
        let Some(service) = &self.data.service else {
            return Vec::new();
        };
        service
            .required_config()
            .iter()
            .copied()
            .filter(|key| match self.data.config.get(*key) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: ConfigMap,
    /// Fields the client does not interpret (icons, descriptions, ...), kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Payload for persisting a workflow built from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    pub workflow_data: WorkflowData,
}

/// A workflow as returned by the backend after saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_workflow_data")]
    pub workflow_data: WorkflowData,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template_json(workflow_data: Value) -> Value {
        json!({
            "id": 7,
            "name": "Sheets to Slack",
            "description": "Post new rows",
            "category": "productivity",
            "tags": ["sheets", "slack"],
            "complexity": "beginner",
            "workflowData": workflow_data
        })
    }

    #[test]
    fn test_parse_template_with_inline_graph() {
        let value = template_json(json!({
            "nodes": [{
                "id": "n1",
                "type": "trigger",
                "position": { "x": 10.0, "y": 20.0 },
                "data": {
                    "label": "New row",
                    "service": "google-sheets",
                    "event": "new_row",
                    "config": { "spreadsheet_id": "${spreadsheet_id}" },
                    "icon": "sheet"
                }
            }],
            "edges": [{ "id": "e1", "source": "n1", "target": "n2" }]
        }));

        let template: WorkflowTemplate = serde_json::from_value(value).unwrap();
        assert_eq!(template.workflow_data.nodes.len(), 1);
        assert_eq!(template.workflow_data.edges.len(), 1);

        let node = &template.workflow_data.nodes[0];
        assert_eq!(node.node_type, "trigger");
        assert_eq!(node.data.service, Some(Service::GoogleSheets));
        assert_eq!(node.data.extra.get("icon"), Some(&json!("sheet")));
        assert_eq!(template.level(), Some("beginner"));
    }

    #[test]
    fn test_parse_template_with_string_graph() {
        let graph = json!({ "nodes": [{ "id": "a", "data": { "label": "A" } }], "edges": [] });
        let value = template_json(Value::String(graph.to_string()));

        let template: WorkflowTemplate = serde_json::from_value(value).unwrap();
        assert_eq!(template.workflow_data.nodes[0].label(), "A");
    }

    #[test]
    fn test_malformed_graph_degrades_to_empty() {
        let value = template_json(Value::String("{not json".to_string()));
        let template: WorkflowTemplate = serde_json::from_value(value).unwrap();
        assert!(template.workflow_data.nodes.is_empty());
        assert!(template.workflow_data.edges.is_empty());

        let value = template_json(json!({ "nodes": "oops" }));
        let template: WorkflowTemplate = serde_json::from_value(value).unwrap();
        assert!(template.workflow_data.nodes.is_empty());

        let value = template_json(json!(42));
        let template: WorkflowTemplate = serde_json::from_value(value).unwrap();
        assert_eq!(template.workflow_data, WorkflowData::default());
    }

    #[test]
    fn test_missing_graph_is_empty() {
        let template: WorkflowTemplate =
            serde_json::from_value(json!({ "id": 1, "name": "Bare" })).unwrap();
        assert!(template.workflow_data.nodes.is_empty());
        assert_eq!(template.level(), None);
    }

    #[test]
    fn test_node_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "id": "n1",
            "type": "action",
            "position": { "x": 0.0, "y": 0.0 },
            "data": { "label": "Send", "service": "slack", "config": {}, "color": "#fff" }
        });
        let node: Node = serde_json::from_value(raw.clone()).unwrap();
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["data"]["color"], json!("#fff"));
        assert_eq!(back["data"]["service"], json!("slack"));
    }

    #[test]
    fn test_null_columns_read_as_defaults() {
        let node: Node = serde_json::from_value(json!({
            "id": "n1",
            "type": null,
            "position": null,
            "data": { "label": null, "service": null, "config": null }
        }))
        .unwrap();
        assert_eq!(node.label(), "n1");
        assert!(node.config().is_empty());

        let graph = WorkflowData::from_value(json!({ "nodes": null, "edges": null }));
        assert_eq!(graph, WorkflowData::default());
    }

    #[test]
    fn test_missing_required_config() {
        let node: Node = serde_json::from_value(json!({
            "id": "n1",
            "data": { "service": "google-sheets", "config": { "spreadsheet_id": "  " } }
        }))
        .unwrap();
        assert_eq!(node.missing_required_config(), vec!["spreadsheet_id"]);

        let untyped: Node = serde_json::from_value(json!({ "id": "n2" })).unwrap();
        assert!(untyped.missing_required_config().is_empty());
        assert_eq!(untyped.label(), "n2");
    }
}
