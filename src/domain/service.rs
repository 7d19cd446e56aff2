use serde::{Deserialize, Serialize};
use std::fmt;

/// Third-party service a node talks to.
///
/// Serialized as the plain service string the backend uses. Only canonical
/// names decode to a known variant; aliases (`email`, `cron`, `google_sheets`)
/// and unknown services are kept verbatim in [`Service::Other`] so node data
/// is written back exactly as it was read. Use [`Service::canonical`] or
/// [`Service::matches`] to compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Service {
    GoogleSheets,
    Gmail,
    Slack,
    Webhook,
    Http,
    Schedule,
    Function,
    Other(String),
}

impl Service {
    pub fn as_str(&self) -> &str {
        match self {
            Service::GoogleSheets => "google-sheets",
            Service::Gmail => "gmail",
            Service::Slack => "slack",
            Service::Webhook => "webhook",
            Service::Http => "http",
            Service::Schedule => "schedule",
            Service::Function => "function",
            Service::Other(name) => name,
        }
    }

    /// The known service an alias stands for, or `self` when there is none.
    pub fn canonical(&self) -> Service {
        match self {
            Service::Other(name) => known_alias(name).unwrap_or_else(|| self.clone()),
            known => known.clone(),
        }
    }

    pub fn matches(&self, other: &Service) -> bool {
        self.canonical() == other.canonical()
    }

    pub fn display_name(&self) -> &str {
        match self.canonical() {
            Service::GoogleSheets => "Google Sheets",
            Service::Gmail => "Gmail",
            Service::Slack => "Slack",
            Service::Webhook => "Webhook",
            Service::Http => "HTTP Request",
            Service::Schedule => "Schedule",
            Service::Function => "Function",
            Service::Other(_) => self.as_str(),
        }
    }

    /// Config keys a node of this service cannot run without.
    pub fn required_config(&self) -> &'static [&'static str] {
        match self.canonical() {
            Service::GoogleSheets => &["spreadsheet_id"],
            Service::Gmail => &[],
            Service::Slack => &["channel"],
            Service::Webhook => &[],
            Service::Http => &["url"],
            Service::Schedule => &["cron"],
            Service::Function => &["code"],
            Service::Other(_) => &[],
        }
    }
}

fn known_alias(name: &str) -> Option<Service> {
    let service = match name.to_ascii_lowercase().replace('_', "-").as_str() {
        "google-sheets" | "googlesheets" | "sheets" => Service::GoogleSheets,
        "gmail" | "email" => Service::Gmail,
        "slack" => Service::Slack,
        "webhook" => Service::Webhook,
        "http" | "http-request" => Service::Http,
        "schedule" | "cron" => Service::Schedule,
        "function" | "code" => Service::Function,
        _ => return None,
    };
    Some(service)
}

impl From<String> for Service {
    fn from(value: String) -> Self {
        match value.as_str() {
            "google-sheets" => Service::GoogleSheets,
            "gmail" => Service::Gmail,
            "slack" => Service::Slack,
            "webhook" => Service::Webhook,
            "http" => Service::Http,
            "schedule" => Service::Schedule,
            "function" => Service::Function,
            _ => Service::Other(value),
        }
    }
}

impl From<&str> for Service {
    fn from(value: &str) -> Self {
        Service::from(value.to_string())
    }
}

impl From<Service> for String {
    fn from(value: Service) -> Self {
        match value {
            Service::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
