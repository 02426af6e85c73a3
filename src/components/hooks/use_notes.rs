use crate::models::{Note, Position};
use crate::notes::{
    add_note, new_note, remove_last_note, remove_note, update_note_position, update_note_text,
};
use crate::util::{now_ms, random_unit};
use leptos::prelude::*;

/// Note operations over a shared list signal.
#[derive(Clone, Copy)]
pub(crate) struct NoteActions {
    pub add: Callback<()>,
    pub remove: Callback<String>,
    pub remove_last: Callback<()>,
    pub update_text: Callback<(String, String)>,
    pub update_position: Callback<(String, Position)>,
}

pub(crate) fn use_notes(notes: RwSignal<Vec<Note>>) -> NoteActions {
    NoteActions {
        add: Callback::new(move |_| {
            let note = new_note(now_ms(), random_unit(), random_unit());
            notes.update(|list| add_note(list, note));
        }),
        remove: Callback::new(move |id: String| {
            notes.update(|list| {
                remove_note(list, &id);
            });
        }),
        remove_last: Callback::new(move |_| {
            notes.update(|list| {
                remove_last_note(list);
            });
        }),
        update_text: Callback::new(move |(id, text): (String, String)| {
            notes.update(|list| {
                update_note_text(list, &id, &text);
            });
        }),
        update_position: Callback::new(move |(id, pos): (String, Position)| {
            notes.update(|list| {
                update_note_position(list, &id, pos);
            });
        }),
    }
}
