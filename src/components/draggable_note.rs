use crate::components::ui::PlainTextarea;
use crate::models::{Note, Position, Size};
use crate::notes::DragSession;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

const DRAG_HANDLE_CLASS: &str = "drag-handle";

fn pointer_of(ev: &web_sys::MouseEvent) -> Position {
    Position {
        x: ev.client_x() as f64,
        y: ev.client_y() as f64,
    }
}

fn size_of(el: &web_sys::Element) -> Size {
    let rect = el.get_bounding_client_rect();
    Size {
        width: rect.width(),
        height: rect.height(),
    }
}

/// Sticky note that can be dragged by its header within the parent element.
///
/// Owns its text and position after mount; edits are reported through the callbacks, the
/// position only once the drag ends.
#[component]
pub fn DraggableNote(
    note: Note,
    #[prop(into)] on_text_change: Callback<(String, String)>,
    #[prop(into)] on_position_change: Callback<(String, Position)>,
    #[prop(into)] on_delete: Callback<String>,
) -> impl IntoView {
    let id = StoredValue::new(note.id);
    let text = RwSignal::new(note.text);
    let position = RwSignal::new(note.position);
    let drag: RwSignal<Option<DragSession>> = RwSignal::new(None);
    let note_ref: NodeRef<html::Div> = NodeRef::new();

    let on_mouse_down = move |ev: web_sys::MouseEvent| {
        let on_handle = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .and_then(|el| el.closest(&format!(".{DRAG_HANDLE_CLASS}")).ok().flatten())
            .is_some();
        if !on_handle {
            return;
        }
        ev.prevent_default();
        drag.set(Some(DragSession::start(
            pointer_of(&ev),
            position.get_untracked(),
        )));
    };

    let move_handle = window_event_listener(ev::mousemove, move |ev: web_sys::MouseEvent| {
        let Some(session) = drag.get_untracked() else {
            return;
        };
        let Some(el) = note_ref.get_untracked() else {
            return;
        };
        let Some(parent) = el.parent_element() else {
            return;
        };
        position.set(session.move_to(pointer_of(&ev), size_of(&parent), size_of(&el)));
    });

    let up_handle = window_event_listener(ev::mouseup, move |_: web_sys::MouseEvent| {
        if drag.get_untracked().is_none() {
            return;
        }
        drag.set(None);
        on_position_change.run((id.get_value(), position.get_untracked()));
    });

    on_cleanup(move || {
        move_handle.remove();
        up_handle.remove();
    });

    let on_text = Callback::new(move |value: String| {
        text.set(value.clone());
        on_text_change.run((id.get_value(), value));
    });

    view! {
        <div
            node_ref=note_ref
            data-name="DraggableNote"
            class=move || {
                if drag.get().is_some() {
                    "draggable-note dragging absolute z-10 w-40 cursor-grabbing bg-yellow-100 shadow-lg"
                } else {
                    "draggable-note absolute z-10 w-40 bg-yellow-100 shadow"
                }
            }
            style:left=move || format!("{}px", position.get().x)
            style:top=move || format!("{}px", position.get().y)
            on:mousedown=on_mouse_down
        >
            <div class=format!("{DRAG_HANDLE_CLASS} h-4 cursor-grab bg-yellow-300 border-b border-black") />
            <div class="relative p-3 text-sm">
                <button
                    class="absolute right-1 top-0 text-xs opacity-40 hover:opacity-100 print:hidden"
                    title="Delete note"
                    on:click=move |_| on_delete.run(id.get_value())
                >
                    "×"
                </button>
                <PlainTextarea value=text on_change=on_text />
            </div>
        </div>
    }
}
