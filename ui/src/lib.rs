use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes, A};
use leptos_router::path;

mod api;
mod components;
mod navigator;
mod storage;

use components::catalog::TemplateCatalog;
use components::node_types::NodeTypes;
use components::preview::TemplatePreviewPage;
use components::setup::{TemplateSetupPage, WorkflowCreatedPage};
use components::toast::{ToastHost, Toasts};

#[component]
pub fn App() -> impl IntoView {
    Toasts::provide();

    view! {
        <Router>
            <div class="flex h-screen bg-gray-100">
                // Sidebar
                <div class="w-64 bg-gray-800 text-white p-4 flex flex-col">
                    <h1 class="text-2xl font-bold mb-8">"PumpFlux"</h1>
                    <nav class="space-y-1 flex-1">
                        <NavLink href="/" label="Templates" />
                        <div class="border-t border-gray-700 my-4"></div>
                        <NavLink href="/admin/node-types" label="Node Types" />
                    </nav>
                    <div class="text-xs text-gray-500 mt-4">
                        "PumpFlux Workflow Automation"
                    </div>
                </div>

                // Main Content
                <div class="flex-1 overflow-y-auto">
                    <Routes fallback=|| "Not found.">
                        <Route path=path!("/") view=TemplateCatalog/>
                        <Route path=path!("/templates/:id/setup") view=TemplateSetupPage/>
                        <Route path=path!("/templates/:id") view=TemplatePreviewPage/>
                        <Route path=path!("/workflows/:id") view=WorkflowCreatedPage/>
                        <Route path=path!("/admin/node-types") view=NodeTypes/>
                    </Routes>
                </div>
            </div>
            <ToastHost />
        </Router>
    }
}

#[component]
fn NavLink(href: &'static str, label: &'static str) -> impl IntoView {
    view! {
        <A href=href attr:class="block p-2 hover:bg-gray-700 rounded transition-colors">
            {label}
        </A>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    leptos::mount::mount_to_body(App);
}
