use crate::components::draggable_note::DraggableNote;
use crate::components::hooks::NoteActions;
use crate::models::{Note, ProfileRecord, Theme};
use crate::print::PRINT_AREA_ID;
use leptos::prelude::*;

const CARD_CLASS: &str =
    "print-area aspect-[210/297] w-[595px] h-[842px] flex flex-col items-center gap-8 bg-white relative overflow-hidden";

const MAX_TAGS: usize = 3;

#[component]
fn ThemeBanner(theme: Signal<Theme>) -> impl IntoView {
    view! {
        <div class=move || {
            format!(
                "w-full border-b-4 px-6 py-2 text-lg font-bold tracking-wide {}",
                theme.get().accent_class(),
            )
        }>{move || theme.get().banner()}</div>
    }
}

/// Printable A4 card for a loaded profile, with the notes overlay.
#[component]
pub fn ProfileCard(
    profile: ProfileRecord,
    #[prop(into)] theme: Signal<Theme>,
    notes: RwSignal<Vec<Note>>,
    actions: NoteActions,
) -> impl IntoView {
    let name = profile.display_name();
    let headline = profile.headline();
    let region = profile.region_line();
    let gender = profile.gender();
    let tags = profile.tags(MAX_TAGS);
    let description = profile.description_or_placeholder();
    let avatar = profile.avatar_url();
    let profile_link = profile.profile_link.clone().unwrap_or_default();

    view! {
        <div id=PRINT_AREA_ID data-name="ProfileCard" class=CARD_CLASS>
            <ThemeBanner theme=theme />

            <div class="flex items-center gap-5 px-6 w-full">
                <div class="flex gap-5 items-center">
                    <img
                        src=avatar
                        alt="Avatar"
                        class="size-40 object-cover rounded-full shrink-0 border border-black"
                    />
                    <div class="flex flex-col gap-5 justify-around">
                        <div class="text-5xl font-bold">{name}</div>
                        <div class="space-y-1 text-2xl font-medium">
                            {headline.map(|h| view! { <div>{h}</div> })}
                            {region.map(|r| view! { <div>{r}</div> })}
                            {gender.map(|g| view! { <div>{g}</div> })}
                        </div>
                    </div>
                </div>

                <div class="ml-auto flex flex-col shrink-0 justify-around gap-2">
                    {tags
                        .into_iter()
                        .map(|tag| {
                            view! {
                                <div class="flex flex-col items-center">
                                    <div class="size-12 border-2 border-black bg-yellow-200" />
                                    <div class="text-xl font-medium">{tag}</div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            </div>

            <div class="w-full px-6">
                <div class=move || format!("w-full border-4 p-2 {}", theme.get().accent_class())>
                    <div class="w-full border-2 border-black py-9 px-5">
                        <div class="line-clamp-5 text-xl whitespace-pre-line">{description}</div>
                    </div>
                </div>
            </div>

            <div class="absolute bottom-6 left-6 text-sm opacity-60">{profile_link}</div>

            <For
                each=move || notes.get()
                key=|n: &Note| n.id.clone()
                children=move |note: Note| {
                    view! {
                        <DraggableNote
                            note=note
                            on_text_change=actions.update_text
                            on_position_change=actions.update_position
                            on_delete=actions.remove
                        />
                    }
                }
            />
        </div>
    }
}

/// Placeholder card; with `error_message` set it shows the failure instead of the pulse lines.
#[component]
pub fn SkeletonProfileCard(#[prop(optional, into)] error_message: Option<String>) -> impl IntoView {
    view! {
        <div id=PRINT_AREA_ID data-name="SkeletonProfileCard" class=CARD_CLASS>
            <div class="w-full h-5 animate-pulse bg-gray-200" />

            <div class="flex items-center gap-5 px-6 w-full">
                <div class="flex gap-5 items-center">
                    <div class="size-40 rounded-full shrink-0 animate-pulse bg-gray-200" />
                    <div class="flex flex-col gap-5 justify-around">
                        <div class="h-12 w-48 rounded animate-pulse bg-gray-200" />
                        <div class="space-y-2">
                            <div class="h-8 w-64 rounded animate-pulse bg-gray-200" />
                            <div class="h-6 w-40 rounded animate-pulse bg-gray-200" />
                            <div class="h-6 w-24 rounded animate-pulse bg-gray-200" />
                        </div>
                    </div>
                </div>
            </div>

            <div class="w-full px-6">
                <div class="w-full p-2 bg-gray-100 py-9 px-5">
                    {match error_message {
                        Some(msg) => {
                            view! {
                                <div class="flex flex-col items-center justify-center h-32 gap-2">
                                    <div class="text-red-500 text-xl">"⚠️"</div>
                                    <div class="text-red-500 text-lg text-center">{msg}</div>
                                    <div class="text-gray-500 text-sm text-center">
                                        "Please check that the username is correct"
                                    </div>
                                </div>
                            }
                                .into_any()
                        }
                        None => {
                            view! {
                                <div class="space-y-3">
                                    <div class="h-6 w-full rounded animate-pulse bg-gray-200" />
                                    <div class="h-6 w-5/6 rounded animate-pulse bg-gray-200" />
                                    <div class="h-6 w-4/5 rounded animate-pulse bg-gray-200" />
                                    <div class="h-6 w-3/4 rounded animate-pulse bg-gray-200" />
                                </div>
                            }
                                .into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}
