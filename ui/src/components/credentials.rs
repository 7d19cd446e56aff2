use leptos::prelude::*;
use pumpflux::setup::TemplateSetup;

/// One input per `${name}` / `{{name}}` token found in the template's nodes.
#[component]
pub fn CredentialsForm(setup: RwSignal<Option<TemplateSetup>>) -> impl IntoView {
    // Only re-render the inputs when the set of names changes, not on each keystroke.
    let names = Memo::new(move |_| {
        setup.with(|s| {
            s.as_ref()
                .map(|s| s.credentials().names().map(str::to_string).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    });

    view! {
        {move || {
            let names = names.get();
            if names.is_empty() {
                return view! {
                    <p class="text-sm text-gray-500">"This template needs no credentials."</p>
                }.into_any();
            }
            view! {
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    {names.into_iter().map(|name| view! { <CredentialInput setup=setup name=name /> }).collect::<Vec<_>>()}
                </div>
            }.into_any()
        }}
    }
}

#[component]
fn CredentialInput(setup: RwSignal<Option<TemplateSetup>>, name: String) -> impl IntoView {
    let value = {
        let key = name.clone();
        move || {
            setup.with(|s| {
                s.as_ref()
                    .and_then(|s| s.credentials().get(&key))
                    .unwrap_or_default()
                    .to_string()
            })
        }
    };
    let missing = {
        let value = value.clone();
        move || value().is_empty()
    };
    let key = name.clone();

    view! {
        <div>
            <label class="block text-sm font-medium text-gray-700 mb-1 font-mono">{name.clone()}</label>
            <input
                type="password"
                class=move || {
                    let base = "w-full px-3 py-2 border rounded-md focus:outline-none focus:ring-2 focus:ring-green-500";
                    if missing() {
                        format!("{} border-orange-300", base)
                    } else {
                        format!("{} border-gray-300", base)
                    }
                }
                placeholder=format!("Value for {}", name)
                prop:value=value
                on:input=move |ev| {
                    let input = event_target_value(&ev);
                    setup.update(|s| {
                        if let Some(s) = s {
                            s.set_credential(&key, input);
                        }
                    });
                }
            />
        </div>
    }
}
