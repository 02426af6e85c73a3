use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Unstyled text input bound to a string signal.
#[component]
pub fn PlainInput(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(into, optional)] aria_label: String,

    // Manual two-way wiring; `bind:value` has moved between Leptos releases.
    #[prop(into)] bind_value: RwSignal<String>,

    #[prop(optional)] node_ref: NodeRef<html::Input>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "min-w-0 bg-transparent outline-none placeholder:text-gray-400",
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                bind_value.set(input.value());
            }
        }
    };

    view! {
        <input
            data-name="PlainInput"
            type="text"
            class=merged_class
            placeholder=placeholder
            id=id
            aria-label=aria_label
            autocomplete="off"
            spellcheck="false"
            prop:value=move || bind_value.get()
            on:input=on_input
            node_ref=node_ref
        />
    }
}

/// Unstyled, auto-growing textarea; reports every edit through `on_change`.
#[component]
pub fn PlainTextarea(
    #[prop(into, optional)] class: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "w-full resize-none bg-transparent outline-none [field-sizing:content]",
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(area) = target.dyn_ref::<web_sys::HtmlTextAreaElement>() {
                on_change.run(area.value());
            }
        }
    };

    view! {
        <textarea
            data-name="PlainTextarea"
            class=merged_class
            rows="1"
            prop:value=move || value.get()
            on:input=on_input
        />
    }
}
