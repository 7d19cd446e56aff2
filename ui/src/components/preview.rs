use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use pumpflux::navigation::Route;
use pumpflux::preview::TemplatePreview;
use pumpflux::ApiError;

use crate::api;
use crate::components::list_filter::TagBadges;

/// The route's numeric `:id` parameter.
pub fn use_id_param() -> Memo<Option<i64>> {
    let params = use_params_map();
    Memo::new(move |_| params.with(|p| p.get("id").and_then(|id| id.parse::<i64>().ok())))
}

#[component]
pub fn TemplatePreviewPage() -> impl IntoView {
    let id = use_id_param();
    let template = LocalResource::new(move || {
        let id = id.get();
        async move {
            match id {
                Some(id) => api::get_template(id).await,
                None => Err(ApiError::NotFound("invalid template id".to_string())),
            }
        }
    });
    let show_config = RwSignal::new(false);

    view! {
        <div class="p-6">
            <div class="mb-6">
                <a href=Route::Catalog.path() class="text-blue-500 hover:underline">"← Back to Templates"</a>
            </div>

            <Suspense fallback=move || view! { <div class="text-gray-500">"Loading..."</div> }>
                {move || template.get().map(|result| match result {
                    Ok(template) => {
                        let preview = TemplatePreview::from_template(&template);
                        let config = TemplatePreview::config_dump(&template);
                        view! {
                            <PreviewBody preview=preview config=config show_config=show_config />
                        }.into_any()
                    }
                    Err(e) => view! {
                        <div class="text-red-500">{format!("Failed to load template: {}", e)}</div>
                    }.into_any(),
                })}
            </Suspense>
        </div>
    }
}

#[component]
fn PreviewBody(preview: TemplatePreview, config: String, show_config: RwSignal<bool>) -> impl IntoView {
    let setup_href = Route::TemplateSetup(preview.id).path();
    let needs_credentials = preview.needs_credentials();
    let placeholders = preview.placeholders.clone();

    view! {
        <div class="space-y-6 max-w-4xl">
            <div class="bg-white rounded-lg shadow p-6">
                <div class="flex justify-between items-start">
                    <div>
                        <h2 class="text-2xl font-bold mb-1">{preview.name.clone()}</h2>
                        <p class="text-gray-600">{preview.description.clone()}</p>
                    </div>
                    <a href=setup_href class="bg-green-500 hover:bg-green-600 text-white px-4 py-2 rounded">
                        "Use this template"
                    </a>
                </div>
                <div class="flex flex-wrap gap-2 mt-4">
                    <span class="px-2 py-1 text-xs font-semibold rounded-full bg-green-100 text-green-800">
                        {preview.category.clone()}
                    </span>
                    {preview.level.clone().map(|level| view! {
                        <span class="px-2 py-1 text-xs rounded bg-gray-100 text-gray-800">{level}</span>
                    })}
                </div>
                <div class="mt-3">
                    <TagBadges tags=preview.tags.clone() max_display=10 />
                </div>
            </div>

            <div class="bg-white rounded-lg shadow p-6">
                <h3 class="text-lg font-semibold text-gray-800 mb-4">{format!("Nodes ({})", preview.nodes.len())}</h3>
                <ul class="divide-y divide-gray-200">
                    {preview.nodes.into_iter().map(|node| {
                        let service = node.service.as_ref().map(|s| s.display_name().to_string());
                        let missing = node.missing_config.join(", ");
                        view! {
                            <li class="py-3 flex justify-between">
                                <div>
                                    <div class="font-medium text-gray-900">{node.label}</div>
                                    <div class="text-sm text-gray-500 font-mono">{node.id}</div>
                                </div>
                                <div class="text-right text-sm text-gray-600">
                                    <div>{service.unwrap_or_else(|| node.node_type.clone())}</div>
                                    <div>{node.operation.unwrap_or_default()}</div>
                                    <div>{format!("{} config keys", node.config_keys)}</div>
                                    {(!missing.is_empty()).then(|| view! {
                                        <div class="text-orange-600">{format!("Needs: {}", missing)}</div>
                                    })}
                                </div>
                            </li>
                        }
                    }).collect::<Vec<_>>()}
                </ul>
            </div>

            <div class="bg-white rounded-lg shadow p-6">
                <h3 class="text-lg font-semibold text-gray-800 mb-4">{format!("Connections ({})", preview.edges.len())}</h3>
                <ul class="space-y-2">
                    {preview.edges.into_iter().map(|edge| view! {
                        <li class="flex items-center space-x-2 text-sm">
                            <span class="px-3 py-1 bg-gray-100 rounded font-mono">{edge.from}</span>
                            <span class="text-gray-400">"→"</span>
                            <span class="px-3 py-1 bg-gray-100 rounded font-mono">{edge.to}</span>
                            {edge.label.map(|label| view! { <span class="text-gray-500">{label}</span> })}
                        </li>
                    }).collect::<Vec<_>>()}
                </ul>
            </div>

            {needs_credentials.then(|| view! {
                <div class="bg-yellow-50 border border-yellow-300 rounded-lg p-4 text-sm text-yellow-800">
                    {format!("You will be asked for: {}", placeholders.join(", "))}
                </div>
            })}

            <div class="bg-white rounded-lg shadow p-6">
                <button
                    class="text-sm text-blue-600 hover:text-blue-900"
                    on:click=move |_| show_config.update(|v| *v = !*v)
                >
                    {move || if show_config.get() { "Hide configuration" } else { "Show configuration" }}
                </button>
                {move || show_config.get().then(|| view! {
                    <pre class="mt-4 p-4 bg-gray-900 text-green-200 rounded text-xs overflow-x-auto">{config.clone()}</pre>
                })}
            </div>
        </div>
    }
}
