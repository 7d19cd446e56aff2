//! Admin page for node-type definitions. Definitions are edited as JSON.

use leptos::prelude::*;
use pumpflux::domain::NodeTypeDefinition;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::components::toast::use_toasts;

const NEW_DEFINITION: &str = r#"{
  "name": "",
  "service": "http",
  "fields": [
    { "name": "url", "label": "URL", "type": "text", "required": true }
  ]
}"#;

/// What the editor is currently working on.
#[derive(Clone, Copy, PartialEq)]
enum Editing {
    New,
    Existing(i64),
}

#[component]
pub fn NodeTypes() -> impl IntoView {
    let toasts = use_toasts();
    let version = RwSignal::new(0u32);
    let definitions = LocalResource::new(move || {
        version.track();
        async move { api::list_node_types().await }
    });

    let editing = RwSignal::new(None::<Editing>);
    let source = RwSignal::new(String::new());

    let edit = move |target: Editing, definition: Option<NodeTypeDefinition>| {
        let text = match definition {
            Some(d) => serde_json::to_string_pretty(&d).unwrap_or_default(),
            None => NEW_DEFINITION.to_string(),
        };
        source.set(text);
        editing.set(Some(target));
    };

    let delete = move |id: i64, name: String| {
        spawn_local(async move {
            match api::delete_node_type(id).await {
                Ok(()) => {
                    toasts.success(format!("Deleted {}", name));
                    version.update(|v| *v += 1);
                }
                Err(e) => toasts.error(format!("Failed to delete {}: {}", name, e)),
            }
        });
    };

    view! {
        <div class="p-6">
            <div class="flex justify-between items-center mb-6">
                <h2 class="text-2xl font-bold">"Node Types"</h2>
                <button
                    class="bg-blue-500 hover:bg-blue-600 text-white px-4 py-2 rounded"
                    on:click=move |_| edit(Editing::New, None)
                >
                    "+ New Node Type"
                </button>
            </div>

            {move || editing.get().map(|target| view! {
                <DefinitionEditor target=target source=source editing=editing version=version />
            })}

            <Suspense fallback=move || view! { <div class="text-gray-500">"Loading..."</div> }>
                {move || definitions.get().map(|result| match result {
                    Ok(list) if !list.is_empty() => view! {
                        <div class="bg-white rounded-lg shadow overflow-hidden">
                            <table class="min-w-full divide-y divide-gray-200">
                                <thead class="bg-gray-50">
                                    <tr>
                                        <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Name"</th>
                                        <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Service"</th>
                                        <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Bound node"</th>
                                        <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Fields"</th>
                                        <th class="px-6 py-3 text-right text-xs font-medium text-gray-500 uppercase tracking-wider">"Actions"</th>
                                    </tr>
                                </thead>
                                <tbody class="bg-white divide-y divide-gray-200">
                                    {list.into_iter().map(|definition| {
                                        let id = definition.id;
                                        let name = definition.name.clone();
                                        let for_edit = definition.clone();
                                        view! {
                                            <tr class="hover:bg-gray-50">
                                                <td class="px-6 py-4 whitespace-nowrap">
                                                    <div class="font-medium text-gray-900">{definition.name.clone()}</div>
                                                    <div class="text-sm text-gray-500">{definition.description.clone().unwrap_or_default()}</div>
                                                </td>
                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-600">
                                                    {definition.service.as_ref().map(|s| s.display_name().to_string()).unwrap_or_else(|| "-".to_string())}
                                                </td>
                                                <td class="px-6 py-4 whitespace-nowrap text-sm font-mono text-gray-600">
                                                    {definition.node_id.clone().unwrap_or_else(|| "-".to_string())}
                                                </td>
                                                <td class="px-6 py-4 whitespace-nowrap">
                                                    <span class="px-2 py-1 text-xs font-semibold rounded-full bg-blue-100 text-blue-800">
                                                        {definition.fields.len()}
                                                    </span>
                                                </td>
                                                <td class="px-6 py-4 whitespace-nowrap text-right text-sm font-medium">
                                                    {id.map(|id| {
                                                        let for_edit = for_edit.clone();
                                                        let name = name.clone();
                                                        view! {
                                                            <button
                                                                class="text-blue-600 hover:text-blue-900 mr-3"
                                                                on:click=move |_| edit(Editing::Existing(id), Some(for_edit.clone()))
                                                            >
                                                                "Edit"
                                                            </button>
                                                            <button
                                                                class="text-red-600 hover:text-red-900"
                                                                on:click=move |_| delete(id, name.clone())
                                                            >
                                                                "Delete"
                                                            </button>
                                                        }
                                                    })}
                                                </td>
                                            </tr>
                                        }
                                    }).collect::<Vec<_>>()}
                                </tbody>
                            </table>
                        </div>
                    }.into_any(),
                    Ok(_) => view! {
                        <div class="text-center py-12 bg-white rounded-lg shadow">
                            <p class="text-gray-500">"No node types defined"</p>
                        </div>
                    }.into_any(),
                    Err(e) => view! {
                        <div class="text-red-500">{format!("Failed to load node types: {}", e)}</div>
                    }.into_any(),
                })}
            </Suspense>
        </div>
    }
}

#[component]
fn DefinitionEditor(
    target: Editing,
    source: RwSignal<String>,
    editing: RwSignal<Option<Editing>>,
    version: RwSignal<u32>,
) -> impl IntoView {
    let toasts = use_toasts();
    let (saving, set_saving) = signal(false);

    let parsed = Memo::new(move |_| {
        source.with(|text| serde_json::from_str::<NodeTypeDefinition>(text).map_err(|e| e.to_string()))
    });

    let on_save = move |_| {
        let definition = match parsed.get_untracked() {
            Ok(definition) if definition.name.trim().is_empty() => {
                toasts.error("Name is required");
                return;
            }
            Ok(definition) => definition,
            Err(e) => {
                toasts.error(format!("Invalid definition: {}", e));
                return;
            }
        };
        set_saving.set(true);
        spawn_local(async move {
            let result = match target {
                Editing::New => api::create_node_type(&definition).await,
                Editing::Existing(id) => api::update_node_type(id, &definition).await,
            };
            match result {
                Ok(saved) => {
                    toasts.success(format!("Saved {}", saved.name));
                    editing.set(None);
                    version.update(|v| *v += 1);
                }
                Err(e) => toasts.error(format!("Failed to save node type: {}", e)),
            }
            set_saving.set(false);
        });
    };

    let title = match target {
        Editing::New => "New Node Type".to_string(),
        Editing::Existing(id) => format!("Edit Node Type #{}", id),
    };

    view! {
        <div class="bg-white rounded-lg shadow p-6 mb-6">
            <h3 class="text-lg font-semibold text-gray-800 mb-4">{title}</h3>
            <textarea
                class="w-full h-64 px-3 py-2 border border-gray-300 rounded-md font-mono text-sm focus:outline-none focus:ring-2 focus:ring-blue-500"
                prop:value=move || source.get()
                on:input=move |ev| source.set(event_target_value(&ev))
            ></textarea>
            {move || parsed.get().err().map(|e| view! {
                <p class="mt-1 text-sm text-red-600">{e}</p>
            })}
            <div class="flex justify-end space-x-2 mt-4">
                <button
                    class="px-4 py-2 border border-gray-300 rounded text-gray-700 hover:bg-gray-50"
                    on:click=move |_| editing.set(None)
                >
                    "Cancel"
                </button>
                <button
                    class="px-4 py-2 bg-blue-500 hover:bg-blue-600 text-white rounded disabled:opacity-50"
                    disabled=move || saving.get() || parsed.with(Result::is_err)
                    on:click=on_save
                >
                    {move || if saving.get() { "Saving..." } else { "Save" }}
                </button>
            </div>
        </div>
    }
}
