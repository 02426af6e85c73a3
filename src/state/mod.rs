use crate::api::ApiClient;
use crate::models::{Note, Theme};
use crate::storage::{load_notes, load_theme, save_notes, save_theme};
use leptos::prelude::*;

pub(crate) mod debounce;
pub(crate) mod link_polling;
pub(crate) mod nfc_listener;
pub(crate) mod page_state;
pub(crate) mod profile_fetch;

/// Quiet window between the last keystroke and the identifier the fetcher sees.
pub(crate) const IDENTIFIER_DEBOUNCE_MS: u32 = 500;

/// Writes `next` and notifies subscribers only when it differs from the current value.
pub(crate) fn set_if_changed<T>(set: WriteSignal<T>, next: T)
where
    T: PartialEq + Send + Sync + 'static,
{
    set.maybe_update(|cur| {
        if *cur == next {
            return false;
        }
        *cur = next;
        true
    });
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: ApiClient,

    /// Raw identifier; written by the input box and by the link poller alike.
    pub identifier: RwSignal<String>,

    pub theme: RwSignal<Theme>,
    pub notes: RwSignal<Vec<Note>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: ApiClient::from_env(),
            identifier: RwSignal::new(String::new()),
            theme: RwSignal::new(load_theme()),
            notes: RwSignal::new(load_notes()),
        }
    }

    /// Mirrors theme and notes into localStorage whenever they change.
    pub fn persist(&self) {
        let theme = self.theme;
        Effect::new(move |prev: Option<()>| {
            let t = theme.get();
            if prev.is_some() {
                save_theme(t);
            }
        });

        let notes = self.notes;
        Effect::new(move |prev: Option<()>| {
            notes.with(|n| {
                if prev.is_some() {
                    save_notes(n);
                }
            });
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_set_if_changed_skips_equal_values() {
        let owner = Owner::new();
        owner.set();

        let (settled, set_settled) = signal(String::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let seen = {
            let runs = runs.clone();
            Memo::new(move |_| {
                runs.fetch_add(1, Ordering::SeqCst);
                settled.get()
            })
        };
        assert_eq!(seen.get(), "");
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        set_if_changed(set_settled, "alice".to_string());
        assert_eq!(seen.get(), "alice");
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        // Same value again: subscribers are not woken.
        set_if_changed(set_settled, "alice".to_string());
        assert_eq!(seen.get(), "alice");
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        set_if_changed(set_settled, "bob".to_string());
        assert_eq!(seen.get(), "bob");
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
