//! Step-by-step configuration of a workflow's nodes.
//!
//! The wizard visits each node in order (`Step(i)`), then a terminal
//! `Review`. Moving forward validates the current node against its
//! node-type definition; a failing node keeps the wizard where it is and
//! records the errors for display.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{FieldDefinition, FieldType, Node, NodeTypeDefinition, NodeTypeRegistry};
use crate::notice::Notice;

pub mod validation;

pub use validation::{validate_field, validate_node, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Step(usize),
    Review,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Step {0} has not been reached yet")]
    StepNotReached(usize),

    #[error("All nodes must be configured before submitting")]
    NotReady,
}

pub struct NodeConfigWizard {
    nodes: Vec<Node>,
    registry: NodeTypeRegistry,
    step: WizardStep,
    /// Furthest step index the user has reached.
    reached: usize,
    errors: Vec<ValidationError>,
}

impl NodeConfigWizard {
    /// Start at the first node, with defaults filled in from each node's definition.
    pub fn new(mut nodes: Vec<Node>, registry: NodeTypeRegistry) -> Self {
        for node in &mut nodes {
            if let Some(definition) = registry.find_for(node) {
                let added = apply_defaults(node, definition);
                debug!(node = %node.id, added, "Initialized node defaults");
            }
        }
        let step = if nodes.is_empty() {
            WizardStep::Review
        } else {
            WizardStep::Step(0)
        };
        Self {
            nodes,
            registry,
            step,
            reached: 0,
            errors: Vec::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.step {
            WizardStep::Step(i) => Some(i),
            WizardStep::Review => None,
        }
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.current_index().and_then(|i| self.nodes.get(i))
    }

    pub fn current_definition(&self) -> Option<&NodeTypeDefinition> {
        self.current_node().and_then(|n| self.registry.find_for(n))
    }

    pub fn definition_for(&self, node: &Node) -> Option<&NodeTypeDefinition> {
        self.registry.find_for(node)
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Message for a field of the current node, if its last validation failed.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        let node = self.current_node()?;
        self.errors
            .iter()
            .find(|e| e.node_id == node.id && e.field.as_deref() == Some(field))
            .map(|e| e.message.as_str())
    }

    /// `(position, total)` with position 1-based; review counts as `total + 1`.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.nodes.len();
        match self.step {
            WizardStep::Step(i) => (i + 1, total),
            WizardStep::Review => (total + 1, total),
        }
    }

    pub fn set_field(&mut self, node_id: &str, field: &str, value: Value) -> Result<(), WizardError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| WizardError::UnknownNode(node_id.to_string()))?;
        node.config_mut().insert(field.to_string(), value);
        Ok(())
    }

    /// Validate the current node and advance. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        let WizardStep::Step(index) = self.step else {
            return false;
        };

        let node = &self.nodes[index];
        let errors = validate_node(node, self.registry.find_for(node));
        if !errors.is_empty() {
            debug!(node = %node.id, errors = errors.len(), "Node failed validation");
            self.errors = errors;
            return false;
        }

        self.errors.clear();
        self.step = if index + 1 < self.nodes.len() {
            WizardStep::Step(index + 1)
        } else {
            WizardStep::Review
        };
        self.reached = self.reached.max(index + 1);
        true
    }

    pub fn back(&mut self) {
        self.errors.clear();
        self.step = match self.step {
            WizardStep::Step(i) => WizardStep::Step(i.saturating_sub(1)),
            WizardStep::Review => WizardStep::Step(self.nodes.len().saturating_sub(1)),
        };
        if self.nodes.is_empty() {
            self.step = WizardStep::Review;
        }
    }

    /// Jump back (or forward) to a step the user already reached.
    pub fn go_to(&mut self, index: usize) -> Result<(), WizardError> {
        if index >= self.nodes.len() || index > self.reached {
            return Err(WizardError::StepNotReached(index));
        }
        self.errors.clear();
        self.step = WizardStep::Step(index);
        Ok(())
    }

    /// Hand the edited nodes to `on_complete`. A failing callback is reported
    /// as an error notice; the wizard stays on review so the user can retry.
    pub fn submit<F, E>(&self, on_complete: F) -> Result<Notice, WizardError>
    where
        F: FnOnce(&[Node]) -> Result<(), E>,
        E: std::fmt::Display,
    {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotReady);
        }
        match on_complete(&self.nodes) {
            Ok(()) => Ok(Notice::success(format!("Configured {} nodes", self.nodes.len()))),
            Err(e) => {
                warn!("Wizard completion failed: {}", e);
                Ok(Notice::error(format!("Failed to save configuration: {}", e)))
            }
        }
    }
}

/// Value a field starts with when the node's config does not set it.
pub fn default_value(field: &FieldDefinition) -> Value {
    if let Some(value) = &field.default_value {
        return value.clone();
    }
    match field.field_type {
        FieldType::Boolean => Value::Bool(false),
        FieldType::Number => Value::from(0),
        _ => field
            .options
            .first()
            .map(|option| option.value())
            .unwrap_or_else(|| Value::String(String::new())),
    }
}

/// Insert defaults for declared fields missing from the node's config.
/// Existing keys are never touched. Returns how many fields were added.
pub fn apply_defaults(node: &mut Node, definition: &NodeTypeDefinition) -> usize {
    let config = node.config_mut();
    let mut added = 0;
    for field in &definition.fields {
        if !config.contains_key(&field.name) {
            config.insert(field.name.clone(), default_value(field));
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldOption, Service, ValidationRule};
    use serde_json::json;

    fn node(id: &str, service: &str, config: Value) -> Node {
        serde_json::from_value(json!({
            "id": id,
            "type": "action",
            "data": { "label": id, "service": service, "config": config }
        }))
        .unwrap()
    }

    fn slack_definition() -> NodeTypeDefinition {
        NodeTypeDefinition {
            name: "Slack message".to_string(),
            service: Some(Service::Slack),
            fields: vec![
                FieldDefinition {
                    name: "channel".to_string(),
                    label: "Channel".to_string(),
                    required: true,
                    validation: vec![ValidationRule::Pattern {
                        value: "#[a-z0-9-]+".to_string(),
                        message: None,
                    }],
                    ..Default::default()
                },
                FieldDefinition {
                    name: "notify".to_string(),
                    field_type: FieldType::Boolean,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn sheets_definition() -> NodeTypeDefinition {
        NodeTypeDefinition {
            name: "Sheets".to_string(),
            service: Some(Service::GoogleSheets),
            fields: vec![FieldDefinition {
                name: "spreadsheet_id".to_string(),
                required: true,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn wizard() -> NodeConfigWizard {
        NodeConfigWizard::new(
            vec![
                node("sheet", "google-sheets", json!({ "spreadsheet_id": "abc" })),
                node("post", "slack", json!({})),
            ],
            NodeTypeRegistry::new(vec![sheets_definition(), slack_definition()]),
        )
    }

    #[test]
    fn test_default_value_precedence() {
        let mut f = FieldDefinition {
            name: "f".to_string(),
            field_type: FieldType::Select,
            options: vec![FieldOption::Plain("first".to_string())],
            default_value: Some(json!("explicit")),
            ..Default::default()
        };
        assert_eq!(default_value(&f), json!("explicit"));

        f.default_value = None;
        assert_eq!(default_value(&f), json!("first"));

        f.field_type = FieldType::Boolean;
        assert_eq!(default_value(&f), json!(false));

        f.field_type = FieldType::Number;
        assert_eq!(default_value(&f), json!(0));

        f.field_type = FieldType::Text;
        f.options.clear();
        assert_eq!(default_value(&f), json!(""));
    }

    #[test]
    fn test_defaults_never_overwrite_existing_fields() {
        let mut n = node("post", "slack", json!({ "channel": "#ops", "notify": true }));
        let added = apply_defaults(&mut n, &slack_definition());
        assert_eq!(added, 0);
        assert_eq!(n.config()["channel"], json!("#ops"));
        assert_eq!(n.config()["notify"], json!(true));

        let mut empty = node("post", "slack", json!({}));
        assert_eq!(apply_defaults(&mut empty, &slack_definition()), 2);
        assert_eq!(empty.config()["notify"], json!(false));
    }

    #[test]
    fn test_new_initializes_defaults() {
        let w = wizard();
        assert_eq!(w.step(), WizardStep::Step(0));
        assert_eq!(w.nodes()[1].config()["channel"], json!(""));
        assert_eq!(w.progress(), (1, 2));
    }

    #[test]
    fn test_next_blocks_on_invalid_node() {
        let mut w = wizard();
        assert!(w.next());
        assert_eq!(w.step(), WizardStep::Step(1));

        assert!(!w.next());
        assert_eq!(w.step(), WizardStep::Step(1));
        assert!(!w.validation_errors().is_empty());
        assert_eq!(w.field_error("channel"), Some("Channel is required"));

        w.set_field("post", "channel", json!("general")).unwrap();
        assert!(!w.next());
        assert_eq!(w.field_error("channel"), Some("Channel has an invalid format"));

        w.set_field("post", "channel", json!("#general")).unwrap();
        assert!(w.next());
        assert_eq!(w.step(), WizardStep::Review);
        assert!(w.validation_errors().is_empty());
    }

    #[test]
    fn test_next_blocks_on_missing_definition() {
        let mut w = NodeConfigWizard::new(
            vec![node("mystery", "notion", json!({}))],
            NodeTypeRegistry::new(vec![slack_definition()]),
        );
        assert!(!w.next());
        assert_eq!(w.step(), WizardStep::Step(0));
        assert_eq!(w.validation_errors()[0].field, None);
    }

    #[test]
    fn test_back_and_review_transitions() {
        let mut w = wizard();
        w.back();
        assert_eq!(w.step(), WizardStep::Step(0));

        w.set_field("post", "channel", json!("#ops")).unwrap();
        assert!(w.next());
        assert!(w.next());
        assert_eq!(w.step(), WizardStep::Review);
        assert!(!w.next());

        w.back();
        assert_eq!(w.step(), WizardStep::Step(1));
    }

    #[test]
    fn test_go_to_only_reached_steps() {
        let mut w = wizard();
        assert_eq!(w.go_to(1), Err(WizardError::StepNotReached(1)));
        assert!(w.next());
        assert!(w.go_to(0).is_ok());
        assert!(w.go_to(1).is_ok());
        assert_eq!(w.go_to(5), Err(WizardError::StepNotReached(5)));
    }

    #[test]
    fn test_empty_wizard_starts_in_review() {
        let w = NodeConfigWizard::new(Vec::new(), NodeTypeRegistry::default());
        assert_eq!(w.step(), WizardStep::Review);
        assert!(w.current_node().is_none());
    }

    #[test]
    fn test_set_field_unknown_node() {
        let mut w = wizard();
        assert_eq!(
            w.set_field("nope", "x", json!(1)),
            Err(WizardError::UnknownNode("nope".to_string()))
        );
    }

    #[test]
    fn test_submit_reports_callback_failure() {
        let mut w = wizard();
        assert_eq!(w.submit(|_| Ok::<(), String>(())), Err(WizardError::NotReady));

        w.set_field("post", "channel", json!("#ops")).unwrap();
        w.next();
        w.next();

        let notice = w.submit(|_| Err("backend down")).unwrap();
        assert!(notice.is_error());
        assert!(notice.message.contains("backend down"));
        assert_eq!(w.step(), WizardStep::Review);

        let mut received = 0;
        let notice = w
            .submit(|nodes| {
                received = nodes.len();
                Ok::<(), String>(())
            })
            .unwrap();
        assert!(!notice.is_error());
        assert_eq!(received, 2);
    }
}
