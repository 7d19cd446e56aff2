//! `Navigator` that moves the browser to a route's path.

use pumpflux::navigation::{Navigator, Route};

#[derive(Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, route: Route) {
        log::debug!("Navigating to {}", route);
        let Some(window) = web_sys::window() else {
            log::error!("No window to navigate in");
            return;
        };
        if let Err(e) = window.location().set_href(&route.path()) {
            log::error!("Navigation to {} failed: {:?}", route, e);
        }
    }
}
