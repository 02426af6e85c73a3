use crate::components::control_panel::PROFILE_LINK_PREFIX;
use crate::components::hooks::use_notes;
use crate::components::{ControlPanel, ProfileCard, SkeletonProfileCard};
use crate::state::debounce::use_debounced;
use crate::state::link_polling::{LinkPollingController, DEFAULT_POLL_INTERVAL_MS};
use crate::state::nfc_listener::use_nfc_listener;
use crate::state::page_state::{use_page_state, ReconcileInputs};
use crate::state::profile_fetch::use_profile_fetch;
use crate::state::{AppContext, IDENTIFIER_DEBOUNCE_MS};
use crate::util::identifier_from_link;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ProfileRouteParams {
    pub username: Option<String>,
}

#[component]
pub fn HomePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api = app_state.0.api_client.clone();
    let identifier = app_state.0.identifier;
    let theme = app_state.0.theme;
    let notes = app_state.0.notes;

    // `/:username` seeds the identifier. Done before the debouncer starts so a deep link
    // fetches without waiting out the quiet window.
    let params = use_params::<ProfileRouteParams>();
    let route_username = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.username)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
    };
    if let Some(u) = untrack(route_username) {
        identifier.set(u);
    }
    Effect::new(move |prev: Option<()>| {
        let username = route_username();
        if prev.is_none() {
            return;
        }
        if let Some(u) = username {
            if identifier.get_untracked() != u {
                identifier.set(u);
            }
        }
    });

    let settled = use_debounced(identifier.into(), IDENTIFIER_DEBOUNCE_MS);
    let fetch = use_profile_fetch(settled.into(), api.clone());
    let is_loading = fetch.is_loading();
    let error = fetch.error();
    let last_profile = fetch.last_profile();
    let last_error = fetch.last_error();

    let inputs = Signal::derive(move || {
        let id = settled.get();
        fetch.outcome.with(|o| ReconcileInputs::from_outcome(&id, o))
    });
    let page = use_page_state(inputs);
    // The card only follows the applied state, not the transition flag.
    let card_mode = Memo::new(move |_| page.with(|v| (v.should_show_content, v.should_show_error)));

    let publish_message: RwSignal<Option<String>> = RwSignal::new(None);

    // NFC taps, like remote link changes below, go through the same setter as typing.
    let write_identifier = Callback::new(move |id: String| {
        if !id.is_empty() && identifier.get_untracked() != id {
            identifier.set(id);
        }
    });
    use_nfc_listener(api.clone(), write_identifier);

    let poller = LinkPollingController::new(
        api.clone(),
        DEFAULT_POLL_INTERVAL_MS,
        Callback::new(move |link: String| {
            log!("shared link changed: {link}");
            write_identifier.run(identifier_from_link(&link));
        }),
        // A confirmation from before the outage is no longer trustworthy.
        Callback::new(move |_| publish_message.set(None)),
    );
    poller.start();

    let on_toggle_polling = {
        let poller = poller.clone();
        Callback::new(move |_| {
            if poller.is_polling().get_untracked() {
                poller.stop();
            } else {
                poller.start();
            }
        })
    };

    let on_publish = Callback::new(move |_| {
        let id = settled.get_untracked();
        let id = id.trim();
        if id.is_empty() {
            return;
        }
        let link = format!("{PROFILE_LINK_PREFIX}{id}");
        let api = api.clone();
        publish_message.set(None);
        spawn_local(async move {
            match api.publish_link(&link).await {
                Ok(res) if res.success => publish_message.set(Some(format!("Published {link}"))),
                Ok(_) => publish_message.set(Some("Link service refused the link".to_string())),
                Err(e) => {
                    warn!("publishing {link} failed: {e}");
                    publish_message.set(Some(e.short_label().to_string()));
                }
            }
        });
    });

    let note_actions = use_notes(notes);
    let note_count = Signal::derive(move || notes.with(|n| n.len()));

    // Rendered from the last profile/error so a refetch does not blank the card while the
    // previous state is still applied.
    let card = move || {
        let (show_content, show_error) = card_mode.get();
        if show_content {
            if let Some(profile) = last_profile.get() {
                return view! {
                    <ProfileCard profile=profile theme=theme notes=notes actions=note_actions />
                }
                .into_any();
            }
        }
        if show_error {
            if let Some(message) = last_error.with(|e| e.as_ref().map(|e| e.card_message())) {
                return view! { <SkeletonProfileCard error_message=message.to_string() /> }
                    .into_any();
            }
        }
        view! { <SkeletonProfileCard /> }.into_any()
    };

    view! {
        <div class="min-h-screen bg-gray-100 flex items-center justify-center gap-12 p-8">
            <ControlPanel
                identifier=identifier
                settled=settled
                is_loading=is_loading
                error=error
                link_status=poller.status()
                is_polling=poller.is_polling()
                publish_message=publish_message
                theme=theme
                note_count=note_count
                note_actions=note_actions
                on_print=Callback::new(move |_| crate::print::handle_print())
                on_publish=on_publish
                on_toggle_polling=on_toggle_polling
            />
            <div class=move || {
                if page.get().is_transitioning { "opacity-90 transition-opacity" } else { "transition-opacity" }
            }>{card}</div>
        </div>
    }
}
