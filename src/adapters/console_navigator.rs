use tracing::info;

use crate::navigation::{Navigator, Route};

/// CLI stand-in for the browser router: reports where the user would land.
pub struct ConsoleNavigator {
    app_url: String,
}

impl ConsoleNavigator {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn link(&self, route: Route) -> String {
        format!("{}{}", self.app_url, route.path())
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigating");
        println!("Open {}", self.link(route));
    }
}
