//! Node-type definitions: the field schema and validation rules the backend
//! publishes for each kind of node.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{null_as_default, Node, Service};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Template node this definition is bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldDefinition>,
}

impl NodeTypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Parse a node-type list payload, skipping definitions that do not decode.
/// A non-array payload yields an empty list.
pub fn parse_node_type_list(payload: Value) -> Vec<NodeTypeDefinition> {
    let Value::Array(items) = payload else {
        warn!("Node type payload is not an array");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(definition) => Some(definition),
            Err(e) => {
                warn!("Skipping malformed node type: {}", e);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl FieldDefinition {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// Input widget / value kind of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Password,
    Number,
    Boolean,
    Select,
    Json,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::Json => "json",
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "textarea" | "multiline" => FieldType::Textarea,
            "password" | "secret" | "credential" => FieldType::Password,
            "number" | "integer" | "float" => FieldType::Number,
            "boolean" | "bool" | "checkbox" | "toggle" => FieldType::Boolean,
            "select" | "dropdown" | "enum" => FieldType::Select,
            "json" | "object" => FieldType::Json,
            _ => FieldType::Text,
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

/// An allowed value of a constrained field, either bare or with a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    Plain(String),
    Labeled {
        value: Value,
        #[serde(default)]
        label: String,
    },
}

impl FieldOption {
    pub fn value(&self) -> Value {
        match self {
            FieldOption::Plain(value) => Value::String(value.clone()),
            FieldOption::Labeled { value, .. } => value.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            FieldOption::Plain(value) => value.clone(),
            FieldOption::Labeled { value, label } if label.is_empty() => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            FieldOption::Labeled { label, .. } => label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum ValidationRule {
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MinLength {
        value: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Pattern {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Min {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Max {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Url {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ValidationRule {
    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationRule::Required { message }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Pattern { message, .. }
            | ValidationRule::Min { message, .. }
            | ValidationRule::Max { message, .. }
            | ValidationRule::Email { message }
            | ValidationRule::Url { message } => message.as_deref(),
        }
    }
}

/// Lookup of node-type definitions for the nodes of a workflow.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeRegistry {
    definitions: Vec<NodeTypeDefinition>,
}

impl NodeTypeRegistry {
    pub fn new(definitions: Vec<NodeTypeDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[NodeTypeDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn insert(&mut self, definition: NodeTypeDefinition) {
        self.definitions.push(definition);
    }

    /// Definition for a node: an explicit node-id binding wins, then the
    /// node's service, then a definition named like the node's type.
    pub fn find_for(&self, node: &Node) -> Option<&NodeTypeDefinition> {
        self.definitions
            .iter()
            .find(|d| d.node_id.as_deref() == Some(node.id.as_str()))
            .or_else(|| {
                let service = node.data.service.as_ref()?;
                self.definitions
                    .iter()
                    .find(|d| d.node_id.is_none() && d.service.as_ref().is_some_and(|s| s.matches(service)))
            })
            .or_else(|| {
                if node.node_type.is_empty() {
                    return None;
                }
                self.definitions.iter().find(|d| {
                    d.node_id.is_none() && d.name.eq_ignore_ascii_case(&node.node_type)
                })
            })
    }
}
