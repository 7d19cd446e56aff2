//! Field-level validation against a node-type definition.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

use crate::domain::{FieldDefinition, FieldType, Node, NodeTypeDefinition, ValidationRule};
use crate::resolver::placeholders_in;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(?:\.[^\s@.]+)+$").expect("email pattern is valid")
});

/// A validation failure shown next to the offending node or field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub node_id: String,
    /// `None` when the node as a whole is invalid (e.g. no definition).
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}: {}", self.node_id, field, self.message),
            None => write!(f, "{}: {}", self.node_id, self.message),
        }
    }
}

/// Validate every field of `node` against `definition`.
pub fn validate_node(node: &Node, definition: Option<&NodeTypeDefinition>) -> Vec<ValidationError> {
    let Some(definition) = definition else {
        return vec![ValidationError {
            node_id: node.id.clone(),
            field: None,
            message: format!("No node type definition found for '{}'", node.label()),
        }];
    };

    definition
        .fields
        .iter()
        .filter_map(|field| {
            validate_field(field, node.config().get(&field.name)).map(|message| ValidationError {
                node_id: node.id.clone(),
                field: Some(field.name.clone()),
                message,
            })
        })
        .collect()
}

/// First failure message for a single value, `None` when it is valid.
pub fn validate_field(field: &FieldDefinition, value: Option<&Value>) -> Option<String> {
    let label = field.display_label();
    let required = field.required
        || field
            .validation
            .iter()
            .any(|r| matches!(r, ValidationRule::Required { .. }));

    let value = match value {
        Some(v) if !is_blank(v) => v,
        _ if required => {
            let custom = field.validation.iter().find_map(|r| match r {
                ValidationRule::Required { message } => message.clone(),
                _ => None,
            });
            return Some(custom.unwrap_or_else(|| format!("{} is required", label)));
        }
        _ => return None,
    };

    // filled in from the credentials when the workflow is saved
    if let Value::String(text) = value {
        if placeholders_in(text).next().is_some() {
            return None;
        }
    }

    if let Some(message) = check_type(field, value) {
        return Some(message);
    }

    field
        .validation
        .iter()
        .find_map(|rule| check_rule(rule, label, value).map(|default| {
            rule.message().map(str::to_string).unwrap_or(default)
        }))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_type(field: &FieldDefinition, value: &Value) -> Option<String> {
    let label = field.display_label();
    match field.field_type {
        FieldType::Number if as_number(value).is_none() => {
            Some(format!("{} must be a number", label))
        }
        FieldType::Boolean => match value {
            Value::Bool(_) => None,
            Value::String(s) if s == "true" || s == "false" => None,
            _ => Some(format!("{} must be true or false", label)),
        },
        FieldType::Json => match value {
            Value::Object(_) | Value::Array(_) => None,
            Value::String(s) if serde_json::from_str::<Value>(s).is_ok() => None,
            _ => Some(format!("{} must be valid JSON", label)),
        },
        _ if !field.options.is_empty() => {
            let text = as_text(value);
            let allowed = field
                .options
                .iter()
                .any(|option| as_text(&option.value()) == text);
            (!allowed).then(|| format!("{} must be one of the listed options", label))
        }
        _ => None,
    }
}

fn check_rule(rule: &ValidationRule, label: &str, value: &Value) -> Option<String> {
    match rule {
        ValidationRule::Required { .. } => None,
        ValidationRule::MinLength { value: min, .. } => {
            let len = as_text(value).chars().count();
            (len < *min).then(|| format!("{} must be at least {} characters", label, min))
        }
        ValidationRule::MaxLength { value: max, .. } => {
            let len = as_text(value).chars().count();
            (len > *max).then(|| format!("{} must be at most {} characters", label, max))
        }
        ValidationRule::Pattern { value: pattern, .. } => {
            match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(re) => (!re.is_match(&as_text(value)))
                    .then(|| format!("{} has an invalid format", label)),
                Err(_) => Some(format!("{} has an invalid pattern '{}'", label, pattern)),
            }
        }
        ValidationRule::Min { value: min, .. } => match as_number(value) {
            Some(n) if n < *min => Some(format!("{} must be at least {}", label, min)),
            Some(_) => None,
            None => Some(format!("{} must be a number", label)),
        },
        ValidationRule::Max { value: max, .. } => match as_number(value) {
            Some(n) if n > *max => Some(format!("{} must be at most {}", label, max)),
            Some(_) => None,
            None => Some(format!("{} must be a number", label)),
        },
        ValidationRule::Email { .. } => {
            (!looks_like_email(&as_text(value))).then(|| format!("{} must be a valid email address", label))
        }
        ValidationRule::Url { .. } => {
            (!looks_like_url(&as_text(value))).then(|| format!("{} must be a valid URL", label))
        }
    }
}

fn looks_like_email(text: &str) -> bool {
    EMAIL.is_match(text)
}

fn looks_like_url(text: &str) -> bool {
    match Url::parse(text) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
