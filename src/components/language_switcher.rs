use crate::components::{Icon, LanguageSignal, TourSignal};
use crate::i18n::{language_label, tr, LanguageRegistry};
use dioxus::logger::tracing::warn;
use dioxus::prelude::*;

#[component]
pub fn LanguageSwitcher() -> Element {
    let mut registry = use_context::<Signal<LanguageRegistry>>();
    let tour = use_context::<TourSignal>().0;
    let language = use_context::<LanguageSignal>().0;

    let current = language();
    let supported = registry.read().supported().to_vec();
    let label = tr(&current, "language.label");
    let waiting = tour.read().is_none();

    rsx! {
        div {
            class: "language-switcher",
            role: "group",
            "aria-label": "{label}",
            Icon { name: "globe".to_string(), class: "w-4 h-4".to_string() }
            for code in supported {
                button {
                    key: "{code}",
                    r#type: "button",
                    class: if code == current { "language-option active" } else { "language-option" },
                    "aria-pressed": if code == current { "true" } else { "false" },
                    "data-lang": "{code}",
                    disabled: waiting,
                    onclick: {
                        let code = code.clone();
                        move |_| {
                            let Some(data) = tour.peek().clone() else {
                                return;
                            };
                            if let Err(err) = registry.write().set_language(&code, data) {
                                warn!("{err}");
                            }
                        }
                    },
                    {language_label(&code)}
                }
            }
        }
    }
}
