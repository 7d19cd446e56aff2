//! Step-by-step node configuration on top of `NodeConfigWizard`.
//!
//! The step layout is rebuilt only when the step changes; field values and
//! error messages are their own reactive closures so inputs keep focus
//! while typing.

use leptos::prelude::*;
use pumpflux::domain::{FieldDefinition, FieldType, Node, NodeTypeRegistry};
use pumpflux::setup::TemplateSetup;
use pumpflux::wizard::{NodeConfigWizard, WizardStep};
use pumpflux::ApiError;
use serde_json::Value;

use crate::api;
use crate::components::toast::use_toasts;

pub type WizardState = RwSignal<Option<NodeConfigWizard>>;

/// Definitions for `nodes`: the published list, plus per-node bindings for
/// nodes the list does not cover.
pub async fn load_registry(nodes: &[Node]) -> Result<NodeTypeRegistry, ApiError> {
    let mut registry = NodeTypeRegistry::new(api::list_node_types().await?);
    for node in nodes {
        if registry.find_for(node).is_some() {
            continue;
        }
        if let Some(definition) = api::get_node_type_for_node(&node.id).await? {
            registry.insert(definition);
        }
    }
    log::debug!("Loaded {} node type definitions", registry.len());
    Ok(registry)
}

#[component]
pub fn NodeWizard(wizard: WizardState, setup: RwSignal<Option<TemplateSetup>>) -> impl IntoView {
    let toasts = use_toasts();
    let step = Memo::new(move |_| wizard.with(|w| w.as_ref().map(|w| w.step())));
    let progress = move || wizard.with(|w| w.as_ref().map(|w| w.progress()).unwrap_or((0, 0)));

    let on_submit = move |_| {
        let outcome = wizard.with_untracked(|w| {
            w.as_ref().map(|w| {
                w.submit(|nodes| {
                    if setup.with_untracked(Option::is_none) {
                        return Err("setup is not loaded".to_string());
                    }
                    setup.update(|s| {
                        if let Some(s) = s {
                            s.replace_nodes(nodes.to_vec());
                        }
                    });
                    Ok(())
                })
            })
        });
        match outcome {
            Some(Ok(notice)) => {
                let failed = notice.is_error();
                toasts.push(notice);
                if !failed {
                    wizard.set(None);
                }
            }
            Some(Err(e)) => toasts.error(e.to_string()),
            None => {}
        }
    };

    view! {
        <div class="bg-white rounded-lg shadow p-6">
            <div class="flex justify-between items-center mb-4">
                <h3 class="text-lg font-semibold text-gray-800">"Configure nodes"</h3>
                <span class="text-sm text-gray-500">
                    {move || {
                        let (position, total) = progress();
                        if position > total {
                            "Review".to_string()
                        } else {
                            format!("Step {} of {}", position, total)
                        }
                    }}
                </span>
            </div>

            <StepPills wizard=wizard />

            {move || match step.get() {
                None => ().into_any(),
                Some(WizardStep::Step(index)) => view! { <NodeStep wizard=wizard index=index /> }.into_any(),
                Some(WizardStep::Review) => view! { <Review wizard=wizard /> }.into_any(),
            }}

            <div class="flex justify-between mt-6 pt-4 border-t">
                <div class="space-x-2">
                    <button
                        class="px-4 py-2 border border-gray-300 rounded text-gray-700 hover:bg-gray-50"
                        on:click=move |_| wizard.set(None)
                    >
                        "Cancel"
                    </button>
                    <button
                        class="px-4 py-2 border border-gray-300 rounded text-gray-700 hover:bg-gray-50 disabled:opacity-50"
                        disabled=move || step.get() == Some(WizardStep::Step(0))
                        on:click=move |_| wizard.update(|w| {
                            if let Some(w) = w {
                                w.back();
                            }
                        })
                    >
                        "Back"
                    </button>
                </div>
                {move || if step.get() == Some(WizardStep::Review) {
                    view! {
                        <button class="px-4 py-2 bg-green-500 hover:bg-green-600 text-white rounded" on:click=on_submit>
                            "Apply configuration"
                        </button>
                    }.into_any()
                } else {
                    view! {
                        <button
                            class="px-4 py-2 bg-blue-500 hover:bg-blue-600 text-white rounded"
                            on:click=move |_| wizard.update(|w| {
                                if let Some(w) = w {
                                    w.next();
                                }
                            })
                        >
                            "Next"
                        </button>
                    }.into_any()
                }}
            </div>
        </div>
    }
}

#[component]
fn StepPills(wizard: WizardState) -> impl IntoView {
    let labels = Memo::new(move |_| {
        wizard.with(|w| {
            w.as_ref()
                .map(|w| w.nodes().iter().map(|n| n.label().to_string()).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    });
    let current = move || wizard.with(|w| w.as_ref().and_then(|w| w.current_index()));

    view! {
        <div class="flex flex-wrap gap-2 mb-4">
            {move || labels.get().into_iter().enumerate().map(|(i, label)| view! {
                <button
                    class=move || if current() == Some(i) {
                        "px-3 py-1 rounded text-sm bg-blue-500 text-white"
                    } else {
                        "px-3 py-1 rounded text-sm bg-gray-100 text-gray-700 hover:bg-gray-200"
                    }
                    on:click=move |_| wizard.update(|w| {
                        if let Some(w) = w {
                            // Unreached steps stay locked
                            let _ = w.go_to(i);
                        }
                    })
                >
                    {label}
                </button>
            }).collect::<Vec<_>>()}
        </div>
    }
}

#[component]
fn NodeStep(wizard: WizardState, index: usize) -> impl IntoView {
    let snapshot = wizard.with_untracked(|w| {
        w.as_ref().and_then(|w| {
            let node = w.nodes().get(index)?;
            Some((node.id.clone(), node.label().to_string(), w.definition_for(node).cloned()))
        })
    });
    let Some((node_id, label, definition)) = snapshot else {
        return ().into_any();
    };

    let node_errors = {
        let node_id = node_id.clone();
        move || {
            wizard.with(|w| {
                w.as_ref()
                    .map(|w| {
                        w.validation_errors()
                            .iter()
                            .filter(|e| e.node_id == node_id && e.field.is_none())
                            .map(|e| e.message.clone())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
        }
    };

    let fields = definition.map(|d| d.fields).unwrap_or_default();

    view! {
        <div>
            <h4 class="font-medium text-gray-900 mb-1">{label}</h4>
            <p class="text-sm text-gray-500 font-mono mb-4">{node_id.clone()}</p>
            {move || node_errors().into_iter().map(|message| view! {
                <div class="mb-4 p-3 bg-red-100 border border-red-400 text-red-700 rounded text-sm">{message}</div>
            }).collect::<Vec<_>>()}
            <div class="space-y-4">
                {fields.into_iter().map(|field| view! {
                    <FieldInput wizard=wizard node_id=node_id.clone() field=field />
                }).collect::<Vec<_>>()}
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn FieldInput(wizard: WizardState, node_id: String, field: FieldDefinition) -> impl IntoView {
    let current = {
        let node_id = node_id.clone();
        let name = field.name.clone();
        move || {
            wizard.with(|w| {
                w.as_ref()
                    .and_then(|w| w.nodes().iter().find(|n| n.id == node_id))
                    .and_then(|n| n.config().get(&name).cloned())
                    .unwrap_or(Value::Null)
            })
        }
    };
    let error = {
        let name = field.name.clone();
        move || wizard.with(|w| w.as_ref().and_then(|w| w.field_error(&name)).map(str::to_string))
    };
    let set = {
        let name = field.name.clone();
        move |value: Value| {
            wizard.update(|w| {
                if let Some(w) = w {
                    if let Err(e) = w.set_field(&node_id, &name, value) {
                        log::warn!("{}", e);
                    }
                }
            })
        }
    };

    let input_class = "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500";
    let label = format!("{}{}", field.display_label(), if field.required { " *" } else { "" });
    let placeholder = field.placeholder.clone().unwrap_or_default();

    let input = match field.field_type {
        FieldType::Boolean => view! {
            <input
                type="checkbox"
                class="h-4 w-4 text-blue-600 border-gray-300 rounded"
                prop:checked=move || current().as_bool().unwrap_or(false)
                on:change=move |ev| set(Value::Bool(event_target_checked(&ev)))
            />
        }
        .into_any(),
        FieldType::Select => {
            let options = field.options.clone();
            let values: Vec<Value> = options.iter().map(|o| o.value()).collect();
            let selected = move || {
                let value = current();
                values
                    .iter()
                    .position(|v| *v == value)
                    .map(|i| i.to_string())
                    .unwrap_or_default()
            };
            let choices: Vec<Value> = options.iter().map(|o| o.value()).collect();
            view! {
                <select
                    class=input_class
                    prop:value=selected
                    on:change=move |ev| {
                        if let Some(value) = event_target_value(&ev).parse::<usize>().ok().and_then(|i| choices.get(i)) {
                            set(value.clone());
                        }
                    }
                >
                    <option value="" disabled=true>"Select..."</option>
                    {options.into_iter().enumerate().map(|(i, option)| view! {
                        <option value=i.to_string()>{option.label()}</option>
                    }).collect::<Vec<_>>()}
                </select>
            }
            .into_any()
        }
        FieldType::Textarea | FieldType::Json => {
            let json = field.field_type == FieldType::Json;
            view! {
                <textarea
                    class=format!("{} font-mono text-sm", input_class)
                    rows=if json { 6 } else { 3 }
                    placeholder=placeholder
                    prop:value=move || display_value(&current(), json)
                    on:input=move |ev| {
                        let text = event_target_value(&ev);
                        set(if json { json_input(text) } else { Value::String(text) });
                    }
                ></textarea>
            }
            .into_any()
        }
        FieldType::Number => view! {
            <input
                type="number"
                class=input_class
                placeholder=placeholder
                prop:value=move || display_value(&current(), false)
                on:input=move |ev| set(number_input(event_target_value(&ev)))
            />
        }
        .into_any(),
        FieldType::Password | FieldType::Text => view! {
            <input
                type=if field.field_type == FieldType::Password { "password" } else { "text" }
                class=input_class
                placeholder=placeholder
                prop:value=move || display_value(&current(), false)
                on:input=move |ev| set(Value::String(event_target_value(&ev)))
            />
        }
        .into_any(),
    };

    view! {
        <div>
            <label class="block text-sm font-medium text-gray-700 mb-1">{label}</label>
            {input}
            {field.help_text.clone().map(|help| view! { <p class="mt-1 text-xs text-gray-500">{help}</p> })}
            {move || error().map(|message| view! { <p class="mt-1 text-sm text-red-600">{message}</p> })}
        </div>
    }
}

#[component]
fn Review(wizard: WizardState) -> impl IntoView {
    let nodes = wizard.with_untracked(|w| w.as_ref().map(|w| w.nodes().to_vec()).unwrap_or_default());

    view! {
        <div class="space-y-3">
            <p class="text-sm text-gray-600">"Review the configuration before applying it."</p>
            {nodes.into_iter().map(|node| {
                let config = serde_json::to_string_pretty(node.config()).unwrap_or_default();
                view! {
                    <div class="border rounded p-3">
                        <div class="font-medium text-gray-900 mb-2">{node.label().to_string()}</div>
                        <pre class="text-xs bg-gray-50 p-2 rounded overflow-x-auto">{config}</pre>
                    </div>
                }
            }).collect::<Vec<_>>()}
        </div>
    }
}

fn display_value(value: &Value, pretty: bool) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other if pretty => serde_json::to_string_pretty(other).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Numbers are stored as JSON numbers; anything else is kept verbatim for
/// the validator to reject.
fn number_input(text: String) -> Value {
    if let Ok(n) = text.trim().parse::<i64>() {
        return Value::from(n);
    }
    match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Value::from(n),
        _ => Value::String(text),
    }
}

/// Structured JSON is stored parsed; partial input stays a string.
fn json_input(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(text),
    }
}
