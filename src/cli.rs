use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::catalog::TemplateSort;

/// PumpFlux command-line client: browse workflow templates and turn them into workflows
#[derive(Parser, Debug, Clone)]
#[command(name = "pumpflux", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "PUMPFLUX_CONFIG", default_value = "pumpflux.toml")]
    pub config: PathBuf,

    /// Backend URL, overrides `api.base_url`
    #[arg(long, env = "PUMPFLUX_API_URL")]
    pub api_url: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List templates
    Templates {
        /// Words that must all appear in the name, description or tags
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Difficulty/complexity level (beginner, intermediate, advanced)
        #[arg(long)]
        complexity: Option<String>,

        /// name, category, complexity or newest
        #[arg(long, default_value = "name")]
        sort: TemplateSort,

        /// Only favorite templates
        #[arg(long)]
        favorites: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Preview a template's nodes, connections and required credentials
    Show {
        id: i64,

        /// Also print every node's configuration
        #[arg(long)]
        with_config: bool,
    },

    /// Add or remove a template from favorites
    Favorite { id: i64 },

    /// Create a workflow from a template
    Setup {
        id: i64,

        /// Workflow name (default: "<template name> (copy)")
        #[arg(short, long)]
        name: Option<String>,

        /// Credential value, NAME=VALUE (repeatable)
        #[arg(short = 'k', long = "credential", value_parser = parse_key_value)]
        credentials: Vec<(String, String)>,

        /// Node field value, NODE_ID.FIELD=VALUE (repeatable)
        #[arg(long = "set", value_parser = parse_field_assignment)]
        fields: Vec<FieldAssignment>,

        /// Skip node validation and save the template's configuration as is
        #[arg(long, conflicts_with = "fields")]
        no_wizard: bool,

        /// Print the workflow that would be saved without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage node type definitions
    NodeTypes {
        #[command(subcommand)]
        action: Option<NodeTypeCommand>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NodeTypeCommand {
    /// List all definitions (default)
    List,
    Show { id: i64 },
    /// Create a definition from a JSON file
    Create { file: PathBuf },
    /// Replace a definition with the contents of a JSON file
    Update { id: i64, file: PathBuf },
    Delete { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
    pub node_id: String,
    pub field: String,
    pub value: String,
}

/// Parse `KEY=VALUE`. The value may itself contain `=`. The key is kept as
/// written since placeholder names may contain spaces (`${ api key }`).
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn parse_field_assignment(s: &str) -> Result<FieldAssignment, String> {
    let (target, value) = parse_key_value(s)?;
    let (node_id, field) = target
        .trim()
        .split_once('.')
        .filter(|(n, f)| !n.is_empty() && !f.is_empty())
        .ok_or_else(|| format!("expected NODE_ID.FIELD=VALUE, got '{}'", s))?;
    Ok(FieldAssignment {
        node_id: node_id.to_string(),
        field: field.to_string(),
        value,
    })
}

impl FieldAssignment {
    /// The value as JSON when it parses as JSON (`42`, `true`, `{"a":1}`), otherwise as a string.
    pub fn json_value(&self) -> Value {
        serde_json::from_str(&self.value).unwrap_or_else(|_| Value::String(self.value.clone()))
    }
}
