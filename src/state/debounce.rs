use crate::state::set_if_changed;
use crate::util::now_ms;
use leptos::prelude::*;
use leptos_dom::helpers::{set_timeout_with_handle, TimeoutHandle};
use std::time::Duration;

/// Latest-value-wins settle buffer.
///
/// Every `push` replaces the pending value and restarts the quiet window; `poll` hands out the
/// pending value once the window has fully elapsed. Clock values are passed in so the buffer can
/// be driven by browser timers or by tests.
#[derive(Clone, Debug)]
pub(crate) struct Debouncer<T> {
    delay_ms: i64,
    pending: Option<(T, i64)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms: delay_ms.max(0),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now_ms: i64) {
        self.pending = Some((value, now_ms + self.delay_ms));
    }

    pub fn deadline(&self) -> Option<i64> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn poll(&mut self, now_ms: i64) -> Option<T> {
        match self.pending {
            Some((_, due)) if now_ms >= due => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Follows `source`, emitting a value only after it stayed unchanged for `delay_ms`.
///
/// The returned signal starts at the source's current value and only notifies when the settled
/// value actually differs. Teardown cancels the pending timer.
pub(crate) fn use_debounced<T>(source: Signal<T>, delay_ms: u32) -> ReadSignal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let (settled, set_settled) = signal(source.get_untracked());
    let buffer: StoredValue<Debouncer<T>> = StoredValue::new(Debouncer::new(delay_ms as i64));
    let timer: StoredValue<Option<TimeoutHandle>> = StoredValue::new(None);

    fn arm<T>(
        buffer: StoredValue<Debouncer<T>>,
        timer: StoredValue<Option<TimeoutHandle>>,
        set_settled: WriteSignal<T>,
    ) where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        if let Some(h) = timer.get_value() {
            h.clear();
        }
        timer.set_value(None);

        let Some(due) = buffer.with_value(|b| b.deadline()) else {
            return;
        };
        let wait = (due - now_ms()).max(0) as u64;

        let handle = set_timeout_with_handle(
            move || {
                timer.set_value(None);
                let ready = buffer
                    .try_update_value(|b| b.poll(now_ms()))
                    .flatten();
                match ready {
                    Some(v) => set_if_changed(set_settled, v),
                    // Fired a little early; wait out the remainder.
                    None => arm(buffer, timer, set_settled),
                }
            },
            Duration::from_millis(wait),
        );
        timer.set_value(handle.ok());
    }

    Effect::new(move |prev: Option<()>| {
        let value = source.get();
        // The first run only registers the dependency.
        if prev.is_none() {
            return;
        }
        buffer.update_value(|b| b.push(value, now_ms()));
        arm(buffer, timer, set_settled);
    });

    on_cleanup(move || {
        if let Some(h) = timer.try_get_value().flatten() {
            h.clear();
        }
        buffer.try_update_value(|b| b.cancel());
    });

    settled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_updates_settle_once_to_last_value() {
        let mut d = Debouncer::new(500);
        let mut settled = Vec::new();

        // Keystrokes 100ms apart: never quiet for the full window.
        for (i, v) in ["a", "al", "ali", "alic", "alice"].into_iter().enumerate() {
            let now = i as i64 * 100;
            if let Some(s) = d.poll(now) {
                settled.push(s);
            }
            d.push(v, now);
        }

        for now in (400..2000).step_by(10) {
            if let Some(s) = d.poll(now) {
                settled.push(s);
            }
        }

        assert_eq!(settled, vec!["alice"]);
    }

    #[test]
    fn test_push_restarts_the_window() {
        let mut d = Debouncer::new(500);
        d.push(1, 0);
        assert_eq!(d.deadline(), Some(500));
        d.push(2, 300);
        assert_eq!(d.deadline(), Some(800));
        assert_eq!(d.poll(500), None);
        assert_eq!(d.poll(799), None);
        assert_eq!(d.poll(800), Some(2));
        assert!(!d.is_pending());
        assert_eq!(d.poll(10_000), None);
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let mut d = Debouncer::new(100);
        d.push("x", 0);
        d.cancel();
        assert_eq!(d.poll(1_000), None);
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn test_separate_quiet_windows_settle_separately() {
        let mut d = Debouncer::new(200);
        d.push("bob", 0);
        assert_eq!(d.poll(200), Some("bob"));
        d.push("carol", 1_000);
        assert_eq!(d.poll(1_100), None);
        assert_eq!(d.poll(1_250), Some("carol"));
    }

    #[test]
    fn test_zero_delay_settles_immediately() {
        let mut d = Debouncer::new(0);
        d.push(7, 42);
        assert_eq!(d.poll(42), Some(7));
    }

    #[test]
    fn test_retyping_same_identifier_does_not_renotify() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

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
        seen.get();

        let mut d = Debouncer::new(500);
        let mut settle = |keys: &[&str], start: i64| {
            for (i, k) in keys.iter().enumerate() {
                d.push(k.to_string(), start + i as i64 * 100);
            }
            if let Some(v) = d.poll(start + 10_000) {
                set_if_changed(set_settled, v);
            }
            seen.get()
        };

        assert_eq!(settle(&["a", "al", "alice"], 0), "alice");
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        // Backspace and retype within one window: settles on the same value.
        assert_eq!(settle(&["alic", "alice"], 20_000), "alice");
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        assert_eq!(settle(&["bob"], 40_000), "bob");
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
