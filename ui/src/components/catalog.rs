use leptos::prelude::*;
use pumpflux::catalog::{
    categories, levels, visible_templates, TemplateFilter, TemplateQuery, TemplateSort,
    ALL_CATEGORIES,
};
use pumpflux::domain::WorkflowTemplate;
use pumpflux::favorites::FavoritesStore;
use pumpflux::navigation::Route;

use crate::api;
use crate::components::list_filter::{CatalogFilterBar, TagBadges};
use crate::components::toast::{use_toasts, Toasts};
use crate::storage::LocalStorage;

type Favorites = RwSignal<Option<FavoritesStore<LocalStorage>>>;

#[component]
pub fn TemplateCatalog() -> impl IntoView {
    let toasts = use_toasts();

    let search = RwSignal::new(String::new());
    let category = RwSignal::new(ALL_CATEGORIES.to_string());
    let complexity = RwSignal::new(ALL_CATEGORIES.to_string());
    let sort = RwSignal::new(TemplateSort::default());
    let favorites_only = RwSignal::new(false);

    let favorites: Favorites = RwSignal::new(match FavoritesStore::load(LocalStorage) {
        Ok(store) => Some(store),
        Err(e) => {
            toasts.error(format!("Favorites are unavailable: {}", e));
            None
        }
    });

    let filter = Memo::new(move |_| TemplateFilter {
        search: Some(search.get()),
        category: Some(category.get()),
        complexity: Some(complexity.get()).filter(|c| c != ALL_CATEGORIES),
        favorites_only: favorites_only.get(),
    });

    let templates = LocalResource::new(move || {
        let query = TemplateQuery::from_filter(&filter.get(), sort.get());
        async move { api::list_templates(&query).await }
    });

    // Filter options come from the unfiltered list so narrowing never hides them.
    let options = LocalResource::new(|| async move {
        api::list_templates(&TemplateQuery::default()).await.unwrap_or_default()
    });
    let category_options = Signal::derive(move || {
        options.get().map(|list| categories(&list)).unwrap_or_default()
    });
    let level_options = Signal::derive(move || {
        options.get().map(|list| levels(&list)).unwrap_or_default()
    });

    view! {
        <div class="p-6">
            <div class="flex justify-between items-center mb-6">
                <h2 class="text-2xl font-bold">"Workflow Templates"</h2>
                <span class="text-sm text-gray-500">
                    {move || favorites.with(|f| {
                        let count = f.as_ref().map(|f| f.len()).unwrap_or(0);
                        format!("{} favorites", count)
                    })}
                </span>
            </div>

            <CatalogFilterBar
                search=search
                category=category
                complexity=complexity
                sort=sort
                favorites_only=favorites_only
                categories=category_options
                levels=level_options
            />

            <Suspense fallback=move || view! { <div class="text-gray-500">"Loading..."</div> }>
                {move || {
                    templates.get().map(|result| match result {
                        Ok(list) => {
                            let ids = favorites.with(|f| f.as_ref().map(|f| f.ids().clone()).unwrap_or_default());
                            let visible: Vec<WorkflowTemplate> =
                                visible_templates(&list, &filter.get(), sort.get(), &ids)
                                    .into_iter()
                                    .cloned()
                                    .collect();
                            if visible.is_empty() {
                                view! {
                                    <div class="text-center py-12 bg-white rounded-lg shadow">
                                        <p class="text-gray-500">"No templates match your filters"</p>
                                    </div>
                                }.into_any()
                            } else {
                                view! {
                                    <div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-4">
                                        {visible.into_iter().map(|template| view! {
                                            <TemplateCard template=template favorites=favorites toasts=toasts />
                                        }).collect::<Vec<_>>()}
                                    </div>
                                }.into_any()
                            }
                        }
                        Err(e) => view! {
                            <div class="text-red-500">{format!("Failed to load templates: {}", e)}</div>
                        }.into_any(),
                    })
                }}
            </Suspense>
        </div>
    }
}

#[component]
fn TemplateCard(template: WorkflowTemplate, favorites: Favorites, toasts: Toasts) -> impl IntoView {
    let id = template.id;
    let level = template.level().unwrap_or("-").to_string();
    let node_count = template.workflow_data.nodes.len();

    let is_favorite = move || favorites.with(|f| f.as_ref().is_some_and(|f| f.contains(id)));
    let on_toggle = move |_| {
        let result = favorites.try_update(|f| f.as_mut().map(|f| f.toggle(id)));
        match result.flatten() {
            Some(Ok(true)) => toasts.success("Added to favorites"),
            Some(Ok(false)) => toasts.success("Removed from favorites"),
            Some(Err(e)) => toasts.error(format!("Could not save favorite: {}", e)),
            None => toasts.error("Favorites are unavailable"),
        }
    };

    view! {
        <div class="bg-white rounded-lg shadow p-4 hover:shadow-md transition-shadow flex flex-col">
            <div class="flex justify-between items-start mb-2">
                <div>
                    <h3 class="font-bold text-lg text-gray-900">{template.name.clone()}</h3>
                    <p class="text-gray-600 text-sm">{template.description.clone()}</p>
                </div>
                <button
                    class=move || if is_favorite() { "text-yellow-500 text-xl" } else { "text-gray-300 hover:text-yellow-400 text-xl" }
                    title=move || if is_favorite() { "Remove from favorites" } else { "Add to favorites" }
                    on:click=on_toggle
                >
                    "★"
                </button>
            </div>
            <div class="flex flex-wrap gap-2 mb-3">
                <span class="px-2 py-1 text-xs font-semibold rounded-full bg-green-100 text-green-800">
                    {template.category.clone()}
                </span>
                <span class="px-2 py-1 text-xs rounded bg-gray-100 text-gray-800">{level}</span>
                <span class="px-2 py-1 text-xs rounded bg-gray-100 text-gray-800">
                    {format!("{} nodes", node_count)}
                </span>
            </div>
            <TagBadges tags=template.tags.clone() />
            <div class="flex justify-end space-x-3 mt-auto pt-4 border-t">
                <a href=Route::TemplatePreview(id).path() class="text-sm text-blue-600 hover:text-blue-900">"Preview"</a>
                <a href=Route::TemplateSetup(id).path() class="text-sm text-green-600 hover:text-green-900">"Use template"</a>
            </div>
        </div>
    }
}
