use crate::api::ApiError;
use crate::components::hooks::NoteActions;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Label, Panel, PanelFootnote, PanelHint, PanelSection,
    PanelTitle, PlainInput, Spinner,
};
use crate::models::Theme;
use crate::state::link_polling::LinkStatus;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

pub(crate) const PROFILE_LINK_PREFIX: &str = "https://bonjour.bio/";

/// Status line under the identifier input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadIndicator {
    Loading,
    Failed,
    Loaded,
}

impl LoadIndicator {
    fn of(is_loading: bool, has_error: bool) -> Self {
        if is_loading {
            LoadIndicator::Loading
        } else if has_error {
            LoadIndicator::Failed
        } else {
            LoadIndicator::Loaded
        }
    }

    fn dot_class(self) -> &'static str {
        match self {
            LoadIndicator::Loading => "w-2 h-2 rounded-full bg-blue-500 animate-pulse",
            LoadIndicator::Failed => "w-2 h-2 rounded-full bg-red-500",
            LoadIndicator::Loaded => "w-2 h-2 rounded-full bg-green-500",
        }
    }

    fn text_class(self) -> &'static str {
        match self {
            LoadIndicator::Loading => "text-blue-600",
            LoadIndicator::Failed => "text-red-600",
            LoadIndicator::Loaded => "text-green-600",
        }
    }

    fn label(self) -> &'static str {
        match self {
            LoadIndicator::Loading => "Loading profile...",
            LoadIndicator::Failed => "Failed to load profile",
            LoadIndicator::Loaded => "Profile loaded",
        }
    }
}

fn link_status_text(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Waiting => "Waiting for a shared link".to_string(),
        LinkStatus::Linked { link } => format!("Linked: {link}"),
        LinkStatus::Unavailable => "Link service unavailable".to_string(),
    }
}

#[component]
pub fn ControlPanel(
    identifier: RwSignal<String>,
    #[prop(into)] settled: Signal<String>,
    #[prop(into)] is_loading: Signal<bool>,
    #[prop(into)] error: Signal<Option<ApiError>>,
    #[prop(into)] link_status: Signal<LinkStatus>,
    #[prop(into)] is_polling: Signal<bool>,
    #[prop(into)] publish_message: Signal<Option<String>>,
    theme: RwSignal<Theme>,
    #[prop(into)] note_count: Signal<usize>,
    note_actions: NoteActions,
    #[prop(into)] on_print: Callback<()>,
    #[prop(into)] on_publish: Callback<()>,
    #[prop(into)] on_toggle_polling: Callback<()>,
) -> impl IntoView {
    let waiting_for_input = move || settled.get() != identifier.get();
    let indicator = move || LoadIndicator::of(is_loading.get(), error.get().is_some());

    let on_theme_change = move |ev: web_sys::Event| {
        let value = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
            .map(|el| el.value());
        if let Some(t) = value.as_deref().and_then(Theme::from_key) {
            theme.set(t);
        }
    };

    view! {
        <Panel attr:data-name="ControlPanel">
            <PanelSection>
                <PanelTitle>"Profile link"</PanelTitle>
                <PanelHint>
                    "Scan the mini-program code and copy your profile link"
                    <Show when=move || is_loading.get()>
                        <span class="text-blue-600">"Loading..."</span>
                    </Show>
                    {move || {
                        error
                            .get()
                            .map(|e| view! { <span class="text-red-600">{e.short_label()}</span> })
                    }}
                </PanelHint>
                <Label html_for="profile-identifier">
                    {PROFILE_LINK_PREFIX}
                    <PlainInput
                        id="profile-identifier"
                        aria_label="Profile Link"
                        class="w-28 border-b border-black px-2 py-1"
                        placeholder="rabithua"
                        bind_value=identifier
                    />
                </Label>
                <Show when=waiting_for_input>
                    <PanelFootnote class="text-gray-500">"Waiting for input to finish..."</PanelFootnote>
                </Show>
                <Show when=move || !settled.with(|s| s.trim().is_empty())>
                    <div class="flex items-center gap-2 text-xs">
                        <div class=move || indicator().dot_class() />
                        <span class=move || indicator().text_class()>{move || indicator().label()}</span>
                    </div>
                </Show>
            </PanelSection>

            <PanelSection>
                <PanelTitle>"Shared link"</PanelTitle>
                <div class="flex items-center gap-2 text-xs">
                    <Show when=move || is_polling.get()>
                        <Spinner class="size-3" />
                    </Show>
                    <span class=move || {
                        match link_status.get() {
                            LinkStatus::Unavailable => "text-red-600",
                            LinkStatus::Linked { .. } => "text-green-600",
                            LinkStatus::Waiting => "text-gray-500",
                        }
                    }>{move || link_status_text(&link_status.get())}</span>
                </div>
                <div class="flex gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || settled.with(|s| s.trim().is_empty())
                        on:click=move |_| on_publish.run(())
                    >
                        "Publish link"
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| on_toggle_polling.run(())
                    >
                        {move || if is_polling.get() { "Pause sync" } else { "Resume sync" }}
                    </Button>
                </div>
                {move || publish_message.get().map(|m| view! { <PanelFootnote>{m}</PanelFootnote> })}
            </PanelSection>

            <PanelSection>
                <PanelTitle>"Theme"</PanelTitle>
                <select
                    class="border border-black bg-white px-2 py-1 text-sm"
                    aria-label="Theme"
                    on:change=on_theme_change
                    prop:value=move || theme.get().key()
                >
                    {Theme::ALL
                        .into_iter()
                        .map(|t| view! { <option value=t.key()>{t.to_string()}</option> })
                        .collect_view()}
                </select>
            </PanelSection>

            <PanelSection>
                <PanelTitle>"Notes"</PanelTitle>
                <PanelHint>"Click a note to type, drag its header to move it"</PanelHint>
                <div class="flex gap-2">
                    <Button size=ButtonSize::Sm on:click=move |_| note_actions.add.run(())>
                        "Add note"
                    </Button>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        attr:disabled=move || note_count.get() == 0
                        on:click=move |_| note_actions.remove_last.run(())
                    >
                        "Remove note"
                    </Button>
                </div>
                <PanelFootnote>{move || format!("Notes: {}", note_count.get())}</PanelFootnote>
            </PanelSection>

            <PanelSection>
                <PanelTitle>"Print"</PanelTitle>
                <Button variant=ButtonVariant::Success on:click=move |_| on_print.run(())>
                    "🖨️ Print card"
                </Button>
                <PanelFootnote>"Prints the card on the right"</PanelFootnote>
            </PanelSection>
        </Panel>
    }
}
