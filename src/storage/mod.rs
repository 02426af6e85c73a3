use crate::models::{Note, Theme};
use leptos::logging::warn;
use serde::{Deserialize, Serialize};

pub(crate) const THEME_KEY: &str = "agi_printer_theme";
pub(crate) const NOTES_KEY: &str = "agi_printer_notes";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("ignoring unreadable localStorage entry {key}: {e}");
            None
        }
    }
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_theme() -> Theme {
    local_storage()
        .and_then(|s| s.get_item(THEME_KEY).ok().flatten())
        .and_then(|k| Theme::from_key(&k))
        .unwrap_or_default()
}

pub(crate) fn save_theme(theme: Theme) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(THEME_KEY, theme.key());
    }
}

pub(crate) fn load_notes() -> Vec<Note> {
    load_json_from_storage::<Vec<Note>>(NOTES_KEY).unwrap_or_default()
}

pub(crate) fn save_notes(notes: &[Note]) {
    save_json_to_storage(NOTES_KEY, &notes);
}
