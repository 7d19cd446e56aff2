//! Typed client routes and the navigation seam.

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Catalog,
    TemplatePreview(i64),
    TemplateSetup(i64),
    Workflow(i64),
    NodeTypes,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Catalog => "/".to_string(),
            Route::TemplatePreview(id) => format!("/templates/{}", id),
            Route::TemplateSetup(id) => format!("/templates/{}/setup", id),
            Route::Workflow(id) => format!("/workflows/{}", id),
            Route::NodeTypes => "/admin/node-types".to_string(),
        }
    }

    /// Inverse of [`Route::path`]. Query strings and trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Catalog),
            ["templates", id] => id.parse().ok().map(Route::TemplatePreview),
            ["templates", id, "setup"] => id.parse().ok().map(Route::TemplateSetup),
            ["workflows", id] => id.parse().ok().map(Route::Workflow),
            ["admin", "node-types"] => Some(Route::NodeTypes),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Moves the user to another screen.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Records every navigation; the last entry is the current route.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history().last().copied()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}
