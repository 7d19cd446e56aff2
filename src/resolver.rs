//! Placeholder credentials in node configs.
//!
//! Template configs reference user-supplied secrets and parameters as
//! `${name}` or `{{name}}` tokens. The resolver collects the distinct names
//! into a [`CredentialMap`] and, once the user has filled it in, substitutes
//! the values back into the configs.
//!
//! Both directions scan the same scope: string values of `config` and string
//! values one level down inside object-valued entries (e.g. a `mapping`
//! sub-object). Deeper values and arrays are left alone.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use crate::domain::{ConfigMap, Node};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}|\{\{([^}]+)\}\}").expect("placeholder pattern is valid")
});

/// Placeholder names in a single string, in order of appearance (with repeats).
pub fn placeholders_in(text: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
}

/// Distinct placeholder names referenced by any node, in first-seen order.
pub fn extract_placeholders(nodes: &[Node]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for node in nodes {
        visit_strings(node.config(), &mut |text: &str| {
            for name in placeholders_in(text) {
                if seen.insert(name.to_string()) {
                    names.push(name.to_string());
                }
            }
        });
    }
    names
}

/// Replace every token whose name is in `credentials`. Unknown and malformed
/// tokens are kept as written.
pub fn substitute<'a>(text: &'a str, credentials: &CredentialMap) -> Cow<'a, str> {
    PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match credentials.get(name) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Copy of `nodes` with credential values substituted into their configs.
pub fn apply_credentials(nodes: &[Node], credentials: &CredentialMap) -> Vec<Node> {
    nodes
        .iter()
        .cloned()
        .map(|mut node| {
            rewrite_strings(node.config_mut(), &mut |text: &str| {
                match substitute(text, credentials) {
                    Cow::Borrowed(_) => None,
                    Cow::Owned(replaced) => Some(replaced),
                }
            });
            node
        })
        .collect()
}

fn visit_strings(config: &ConfigMap, f: &mut impl FnMut(&str)) {
    for value in config.values() {
        match value {
            Value::String(text) => f(text),
            Value::Object(nested) => {
                for inner in nested.values() {
                    if let Value::String(text) = inner {
                        f(text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn rewrite_strings(config: &mut ConfigMap, f: &mut impl FnMut(&str) -> Option<String>) {
    for value in config.values_mut() {
        match value {
            Value::String(text) => {
                if let Some(replaced) = f(text) {
                    *text = replaced;
                }
            }
            Value::Object(nested) => {
                for inner in nested.values_mut() {
                    if let Value::String(text) = inner {
                        if let Some(replaced) = f(text) {
                            *text = replaced;
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Values the user entered for each placeholder of a template.
///
/// Keys are fixed when the map is built; `set` never introduces new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialMap {
    values: BTreeMap<String, String>,
}

impl CredentialMap {
    /// One empty entry per placeholder referenced by `nodes`.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        Self::from_names(extract_placeholders(nodes))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: names.into_iter().map(|n| (n.into(), String::new())).collect(),
        }
    }

    /// Set the value of a known placeholder. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names still without a (non-blank) value.
    pub fn missing(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.values.values().all(|v| !v.trim().is_empty())
    }

    /// Rebuild the key set for `nodes`, keeping values of names that survive.
    pub fn rekey(&self, nodes: &[Node]) -> Self {
        let mut next = Self::from_nodes(nodes);
        for (name, value) in &self.values {
            next.set(name, value.clone());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, config: Value) -> Node {
        serde_json::from_value(json!({ "id": id, "data": { "label": id, "config": config } }))
            .unwrap()
    }

    #[test]
    fn test_spreadsheet_example() {
        let nodes = vec![node(
            "sheet",
            json!({ "spreadsheet_id": "${spreadsheet_id}", "sheet_name": "Sheet1" }),
        )];

        let mut credentials = CredentialMap::from_nodes(&nodes);
        assert_eq!(credentials.names().collect::<Vec<_>>(), vec!["spreadsheet_id"]);
        assert_eq!(credentials.get("spreadsheet_id"), Some(""));

        assert!(credentials.set("spreadsheet_id", "abc123"));
        let resolved = apply_credentials(&nodes, &credentials);
        assert_eq!(
            Value::Object(resolved[0].config().clone()),
            json!({ "spreadsheet_id": "abc123", "sheet_name": "Sheet1" })
        );
    }

    #[test]
    fn test_extraction_is_unique_and_ordered() {
        let nodes = vec![
            node("a", json!({ "token": "{{api_key}}", "channel": "${channel}" })),
            node("b", json!({ "auth": "Bearer {{api_key}}", "to": "${email}" })),
        ];
        // serde_json maps iterate in key order: auth < to, channel < token
        assert_eq!(extract_placeholders(&nodes), vec!["channel", "api_key", "email"]);

        let credentials = CredentialMap::from_nodes(&nodes);
        assert_eq!(credentials.len(), 3);
        for name in extract_placeholders(&nodes) {
            assert!(credentials.contains(&name));
        }
    }

    #[test]
    fn test_multiple_placeholders_in_one_value() {
        let nodes = vec![node("a", json!({ "url": "https://${host}/v1/{{path}}?k=${host}" }))];
        let mut credentials = CredentialMap::from_nodes(&nodes);
        credentials.set("host", "api.example.com");
        credentials.set("path", "items");

        let resolved = apply_credentials(&nodes, &credentials);
        assert_eq!(
            resolved[0].config()["url"],
            json!("https://api.example.com/v1/items?k=api.example.com")
        );
    }

    #[test]
    fn test_names_are_verbatim() {
        let nodes = vec![node("a", json!({ "x": "${ spaced name }" }))];
        assert_eq!(extract_placeholders(&nodes), vec![" spaced name "]);
    }

    #[test]
    fn test_malformed_tokens_are_untouched() {
        let nodes = vec![node("a", json!({ "x": "cost $5 {{open ${unterminated", "y": "${}" }))];
        assert!(extract_placeholders(&nodes).is_empty());

        let resolved = apply_credentials(&nodes, &CredentialMap::default());
        assert_eq!(resolved, nodes);
    }

    #[test]
    fn test_unknown_tokens_are_kept() {
        let nodes = vec![node("a", json!({ "x": "${known}-${other}" }))];
        let mut credentials = CredentialMap::from_names(["known"]);
        credentials.set("known", "k");

        let resolved = apply_credentials(&nodes, &credentials);
        assert_eq!(resolved[0].config()["x"], json!("k-${other}"));
    }

    #[test]
    fn test_empty_values_are_substituted() {
        let nodes = vec![node("a", json!({ "x": "[${secret}]" }))];
        let credentials = CredentialMap::from_nodes(&nodes);
        assert!(!credentials.is_complete());
        assert_eq!(credentials.missing(), vec!["secret"]);

        let resolved = apply_credentials(&nodes, &credentials);
        assert_eq!(resolved[0].config()["x"], json!("[]"));
    }

    #[test]
    fn test_nested_objects_recurse_one_level() {
        let nodes = vec![node(
            "a",
            json!({
                "mapping": { "column": "${column}", "deep": { "ignored": "${too_deep}" } },
                "list": ["${in_array}"],
                "count": 3
            }),
        )];
        assert_eq!(extract_placeholders(&nodes), vec!["column"]);

        let mut credentials = CredentialMap::from_nodes(&nodes);
        credentials.set("column", "B");
        let resolved = apply_credentials(&nodes, &credentials);
        assert_eq!(resolved[0].config()["mapping"]["column"], json!("B"));
        assert_eq!(resolved[0].config()["mapping"]["deep"]["ignored"], json!("${too_deep}"));
        assert_eq!(resolved[0].config()["list"], json!(["${in_array}"]));
    }

    #[test]
    fn test_filled_map_removes_every_placeholder() {
        let nodes = vec![
            node("a", json!({ "k": "{{a}}{{b}}", "m": { "n": "${c}" } })),
            node("b", json!({ "k": "${a} and ${d}" })),
        ];
        let mut credentials = CredentialMap::from_nodes(&nodes);
        let names: Vec<String> = credentials.names().map(String::from).collect();
        for name in &names {
            credentials.set(name, format!("value-of-{}", name));
        }
        assert!(credentials.is_complete());

        let resolved = apply_credentials(&nodes, &credentials);
        assert!(extract_placeholders(&resolved).is_empty());
    }

    #[test]
    fn test_set_rejects_unknown_names() {
        let mut credentials = CredentialMap::from_names(["a"]);
        assert!(!credentials.set("b", "x"));
        assert_eq!(credentials.len(), 1);
    }

    #[test]
    fn test_rekey_keeps_surviving_values() {
        let mut credentials = CredentialMap::from_names(["a", "b"]);
        credentials.set("a", "1");
        credentials.set("b", "2");

        let nodes = vec![node("x", json!({ "k": "${a} ${c}" }))];
        let next = credentials.rekey(&nodes);
        assert_eq!(next.get("a"), Some("1"));
        assert_eq!(next.get("c"), Some(""));
        assert!(!next.contains("b"));
    }
}
