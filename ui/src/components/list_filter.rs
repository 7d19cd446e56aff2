//! Search, filter and sort controls for the template catalog.
//!
//! The controls only write signals; the catalog page turns them into a
//! `TemplateFilter` / `TemplateQuery` and does the filtering itself.

use leptos::prelude::*;
use pumpflux::catalog::{TemplateSort, ALL_CATEGORIES};

/// Filter bar above the catalog grid.
#[component]
pub fn CatalogFilterBar(
    search: RwSignal<String>,
    category: RwSignal<String>,
    complexity: RwSignal<String>,
    sort: RwSignal<TemplateSort>,
    favorites_only: RwSignal<bool>,
    #[prop(into)] categories: Signal<Vec<String>>,
    #[prop(into)] levels: Signal<Vec<String>>,
) -> impl IntoView {
    view! {
        <div class="flex flex-col sm:flex-row flex-wrap gap-3 mb-4">
            <SearchInput value=search placeholder="Search templates..." />
            <SelectFilter label="Category" value=category options=categories />
            <SelectFilter label="Difficulty" value=complexity options=levels />
            <div class="flex items-center gap-2">
                <span class="text-sm text-gray-500">"Sort:"</span>
                <select
                    class="px-3 py-2 border border-gray-300 rounded-md bg-white text-sm font-medium text-gray-700 hover:bg-gray-50 focus:outline-none focus:ring-2 focus:ring-green-500"
                    prop:value=move || sort.get().as_str()
                    on:change=move |ev| {
                        if let Ok(value) = event_target_value(&ev).parse::<TemplateSort>() {
                            sort.set(value);
                        }
                    }
                >
                    {TemplateSort::all().into_iter().map(|s| view! {
                        <option value=s.as_str()>{sort_label(s)}</option>
                    }).collect::<Vec<_>>()}
                </select>
            </div>
            <label class="inline-flex items-center gap-2 text-sm text-gray-700 cursor-pointer">
                <input
                    type="checkbox"
                    class="h-4 w-4 text-green-600 focus:ring-green-500 border-gray-300 rounded"
                    prop:checked=move || favorites_only.get()
                    on:change=move |ev| favorites_only.set(event_target_checked(&ev))
                />
                "Favorites only"
            </label>
        </div>
    }
}

fn sort_label(sort: TemplateSort) -> &'static str {
    match sort {
        TemplateSort::Name => "Name",
        TemplateSort::Category => "Category",
        TemplateSort::Complexity => "Difficulty",
        TemplateSort::Newest => "Newest",
    }
}

/// Text search with a clear button.
#[component]
pub fn SearchInput(
    value: RwSignal<String>,
    #[prop(into, default = "Search...".to_string())]
    placeholder: String,
) -> impl IntoView {
    view! {
        <div class="relative flex-1 max-w-md">
            <div class="absolute inset-y-0 left-0 pl-3 flex items-center pointer-events-none">
                <svg class="h-5 w-5 text-gray-400" fill="none" stroke="currentColor" viewBox="0 0 24 24">
                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M21 21l-6-6m2-5a7 7 0 11-14 0 7 7 0 0114 0z"/>
                </svg>
            </div>
            <input
                type="text"
                class="block w-full pl-10 pr-8 py-2 border border-gray-300 rounded-md leading-5 bg-white placeholder-gray-500 focus:outline-none focus:ring-2 focus:ring-green-500 focus:border-green-500 sm:text-sm"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
            // Clear button - only visibility changes, not the DOM structure
            <button
                class=move || {
                    let base = "absolute inset-y-0 right-0 pr-3 flex items-center text-gray-400 hover:text-gray-600";
                    if value.get().is_empty() {
                        format!("{} invisible", base)
                    } else {
                        base.to_string()
                    }
                }
                on:click=move |_| value.set(String::new())
            >
                <svg class="h-4 w-4" fill="none" stroke="currentColor" viewBox="0 0 24 24">
                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M6 18L18 6M6 6l12 12"/>
                </svg>
            </button>
        </div>
    }
}

/// Dropdown whose first entry is "all" (no filter).
#[component]
pub fn SelectFilter(
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(into)] options: Signal<Vec<String>>,
) -> impl IntoView {
    view! {
        <div class="flex items-center gap-2">
            <span class="text-sm text-gray-500">{format!("{}:", label)}</span>
            <select
                class="px-3 py-2 border border-gray-300 rounded-md bg-white text-sm font-medium text-gray-700 hover:bg-gray-50 focus:outline-none focus:ring-2 focus:ring-green-500"
                prop:value=move || value.get()
                on:change=move |ev| value.set(event_target_value(&ev))
            >
                <option value=ALL_CATEGORIES>"All"</option>
                {move || options.get().into_iter().map(|option| {
                    let text = option.clone();
                    view! { <option value=option>{text}</option> }
                }).collect::<Vec<_>>()}
            </select>
        </div>
    }
}

/// Tag display for cards
#[component]
pub fn TagBadges(
    #[prop(into)] tags: Vec<String>,
    /// Maximum tags to show before truncating
    #[prop(default = 3)]
    max_display: usize,
) -> impl IntoView {
    let display_tags: Vec<_> = tags.iter().take(max_display).cloned().collect();
    let remaining = tags.len().saturating_sub(max_display);

    view! {
        <div class="flex flex-wrap gap-1">
            {display_tags.into_iter().map(|tag| view! {
                <span class="inline-flex items-center px-2 py-0.5 rounded text-xs font-medium bg-gray-100 text-gray-600">
                    {tag}
                </span>
            }).collect::<Vec<_>>()}
            {(remaining > 0).then(|| view! {
                <span class="inline-flex items-center px-2 py-0.5 rounded text-xs font-medium bg-gray-200 text-gray-500">
                    {format!("+{}", remaining)}
                </span>
            })}
        </div>
    }
}
