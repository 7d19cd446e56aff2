use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use pumpflux::notice::{Notice, NoticeLevel};

const DISMISS_AFTER_MS: u32 = 4000;

/// App-wide toast queue, provided once by `App`.
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<(u64, Notice)>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    pub fn provide() -> Self {
        let toasts = Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        };
        provide_context(toasts);
        toasts
    }

    pub fn push(&self, notice: Notice) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        match notice.level {
            NoticeLevel::Error => log::error!("{}", notice.message),
            _ => log::info!("{}", notice.message),
        }
        self.items.update(|items| items.push((id, notice)));

        let items = self.items;
        Timeout::new(DISMISS_AFTER_MS, move || {
            items.update(|items| items.retain(|(i, _)| *i != id));
        })
        .forget();
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notice::error(message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Notice::success(message));
    }

    fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|(i, _)| *i != id));
    }
}

/// Toasts from context. Falls back to a detached queue outside `App`.
pub fn use_toasts() -> Toasts {
    use_context::<Toasts>().unwrap_or_else(Toasts::provide)
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div class="fixed bottom-4 right-4 space-y-2 z-50">
            <For
                each=move || toasts.items.get()
                key=|(id, _)| *id
                children=move |(id, notice)| {
                    let color = match notice.level {
                        NoticeLevel::Success => "bg-green-100 border-green-400 text-green-800",
                        NoticeLevel::Info => "bg-blue-100 border-blue-400 text-blue-800",
                        NoticeLevel::Error => "bg-red-100 border-red-400 text-red-700",
                    };
                    view! {
                        <div class=format!("flex items-start gap-3 p-3 border rounded shadow max-w-sm {}", color)>
                            <span class="flex-1 text-sm">{notice.message}</span>
                            <button class="text-sm opacity-60 hover:opacity-100" on:click=move |_| toasts.dismiss(id)>
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
