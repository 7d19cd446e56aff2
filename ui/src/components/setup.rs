use leptos::prelude::*;
use pumpflux::navigation::{Navigator, Route};
use pumpflux::setup::TemplateSetup;
use pumpflux::wizard::NodeConfigWizard;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::components::credentials::CredentialsForm;
use crate::components::preview::use_id_param;
use crate::components::toast::use_toasts;
use crate::components::wizard::{load_registry, NodeWizard};
use crate::navigator::BrowserNavigator;

/// Turn a template into a workflow: name it, fill in credentials, optionally
/// walk the node wizard, then save.
#[component]
pub fn TemplateSetupPage() -> impl IntoView {
    let toasts = use_toasts();
    let id = use_id_param();

    let setup = RwSignal::new(None::<TemplateSetup>);
    let load_error = RwSignal::new(None::<String>);
    let wizard = RwSignal::new(None::<NodeConfigWizard>);
    let (loading_wizard, set_loading_wizard) = signal(false);
    let (saving, set_saving) = signal(false);

    Effect::new(move |_| {
        let Some(id) = id.get() else {
            load_error.set(Some("Invalid template id".to_string()));
            return;
        };
        spawn_local(async move {
            match api::get_template(id).await {
                Ok(template) => {
                    log::info!("Loaded template {} for setup", template.id);
                    setup.set(Some(TemplateSetup::new(&template)));
                }
                Err(e) => load_error.set(Some(e.to_string())),
            }
        });
    });

    let missing = move || {
        setup.with(|s| {
            s.as_ref()
                .map(|s| s.missing_credentials().into_iter().map(str::to_string).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    let open_wizard = move |_| {
        let Some(nodes) = setup.with_untracked(|s| s.as_ref().map(|s| s.nodes().to_vec())) else {
            return;
        };
        set_loading_wizard.set(true);
        spawn_local(async move {
            match load_registry(&nodes).await {
                Ok(registry) => wizard.set(Some(NodeConfigWizard::new(nodes, registry))),
                Err(e) => toasts.error(format!("Failed to load node types: {}", e)),
            }
            set_loading_wizard.set(false);
        });
    };

    let save = move |_| {
        let Some(built) = setup.with_untracked(|s| s.as_ref().map(|s| s.build_workflow())) else {
            return;
        };
        let workflow = match built {
            Ok(workflow) => workflow,
            Err(e) => {
                toasts.error(e.to_string());
                return;
            }
        };
        set_saving.set(true);
        spawn_local(async move {
            match api::create_workflow(&workflow).await {
                Ok(saved) => {
                    toasts.success(format!("Workflow \"{}\" created", saved.name));
                    BrowserNavigator.navigate(Route::Workflow(saved.id));
                }
                Err(e) => {
                    toasts.error(format!("Failed to save workflow: {}", e));
                    set_saving.set(false);
                }
            }
        });
    };

    view! {
        <div class="p-6">
            <div class="mb-6">
                {move || id.get().map(|id| view! {
                    <a href=Route::TemplatePreview(id).path() class="text-blue-500 hover:underline">"← Back to Preview"</a>
                })}
            </div>

            {move || load_error.get().map(|e| view! {
                <div class="mb-4 p-3 bg-red-100 border border-red-400 text-red-700 rounded">
                    {format!("Failed to load template: {}", e)}
                </div>
            })}

            <Show
                when=move || setup.with(Option::is_some)
                fallback=move || view! {
                    {move || load_error.get().is_none().then(|| view! { <div class="text-gray-500">"Loading..."</div> })}
                }
            >
                <div class="space-y-6 max-w-3xl">
                    <h2 class="text-2xl font-bold">
                        {move || setup.with(|s| s.as_ref().map(|s| format!("Set up \"{}\"", s.template_name())).unwrap_or_default())}
                    </h2>

                    <div class="bg-white rounded-lg shadow p-6">
                        <label class="block text-sm font-medium text-gray-700 mb-1">"Workflow name *"</label>
                        <input
                            type="text"
                            class="w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-green-500"
                            prop:value=move || setup.with(|s| s.as_ref().map(|s| s.name().to_string()).unwrap_or_default())
                            on:input=move |ev| {
                                let name = event_target_value(&ev);
                                setup.update(|s| {
                                    if let Some(s) = s {
                                        s.set_name(name);
                                    }
                                });
                            }
                        />
                    </div>

                    <div class="bg-white rounded-lg shadow p-6">
                        <h3 class="text-lg font-semibold text-gray-800 mb-4">"Credentials"</h3>
                        <CredentialsForm setup=setup />
                        {move || {
                            let missing = missing();
                            (!missing.is_empty()).then(|| view! {
                                <p class="mt-3 text-sm text-orange-600">{format!("Missing: {}", missing.join(", "))}</p>
                            })
                        }}
                    </div>

                    <Show
                        when=move || wizard.with(Option::is_some)
                        fallback=move || view! {
                            <div class="bg-white rounded-lg shadow p-6 flex justify-between items-center">
                                <p class="text-sm text-gray-600">"Review each node's settings before saving."</p>
                                <button
                                    class="px-4 py-2 border border-blue-500 text-blue-600 rounded hover:bg-blue-50 disabled:opacity-50"
                                    disabled=move || loading_wizard.get()
                                    on:click=open_wizard
                                >
                                    {move || if loading_wizard.get() { "Loading..." } else { "Configure nodes" }}
                                </button>
                            </div>
                        }
                    >
                        <NodeWizard wizard=wizard setup=setup />
                    </Show>

                    <div class="flex justify-end">
                        <button
                            class="px-6 py-2 bg-green-500 hover:bg-green-600 text-white rounded disabled:opacity-50"
                            disabled=move || saving.get() || setup.with(|s| !s.as_ref().is_some_and(|s| s.credentials_complete()))
                            on:click=save
                        >
                            {move || if saving.get() { "Saving..." } else { "Create workflow" }}
                        </button>
                    </div>
                </div>
            </Show>
        </div>
    }
}

/// Landing page after a workflow has been created.
#[component]
pub fn WorkflowCreatedPage() -> impl IntoView {
    let id = use_id_param();

    view! {
        <div class="p-6">
            <div class="text-center py-12 bg-white rounded-lg shadow max-w-xl">
                <h2 class="text-2xl font-bold mb-2">"Workflow created"</h2>
                <p class="text-gray-600 mb-4">
                    {move || id.get().map(|id| format!("Workflow #{} is ready to edit.", id)).unwrap_or_default()}
                </p>
                <a href=Route::Catalog.path() class="text-green-600 hover:underline">"Browse more templates"</a>
            </div>
        </div>
    }
}
