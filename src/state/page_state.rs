use crate::state::profile_fetch::FetchOutcome;
use crate::state::set_if_changed;
use crate::util::now_ms;
use leptos::prelude::*;
use leptos_dom::helpers::{set_timeout_with_handle, TimeoutHandle};
use std::time::Duration;

/// Quiet time a new target must survive before it is shown.
pub(crate) const SETTLE_DELAY_MS: i64 = 150;
/// How long `is_transitioning` stays up after a state is applied.
pub(crate) const TRANSITION_HOLD_MS: i64 = 300;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum PageState {
    #[default]
    Idle,
    Loading,
    Error,
    Success,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReconcileInputs {
    pub settled_id: String,
    pub is_loading: bool,
    pub has_error: bool,
    pub has_data: bool,
}

impl ReconcileInputs {
    /// Snapshot of the fetch for `settled_id`; whitespace-only ids count as empty.
    pub fn from_outcome(settled_id: &str, outcome: &FetchOutcome) -> Self {
        Self {
            settled_id: settled_id.trim().to_string(),
            is_loading: outcome.is_loading(),
            has_error: outcome.error().is_some(),
            has_data: outcome.data().is_some(),
        }
    }
}

/// The state the page should move to. Error is checked before data.
pub(crate) fn target_state(inputs: &ReconcileInputs, current: PageState) -> PageState {
    if inputs.settled_id.trim().is_empty() {
        PageState::Idle
    } else if inputs.is_loading {
        PageState::Loading
    } else if inputs.has_error {
        PageState::Error
    } else if inputs.has_data {
        PageState::Success
    } else {
        current
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PageView {
    pub state: PageState,
    pub is_transitioning: bool,
    pub should_show_skeleton: bool,
    pub should_show_error: bool,
    pub should_show_content: bool,
}

impl PageView {
    fn new(state: PageState, is_transitioning: bool) -> Self {
        Self {
            state,
            is_transitioning,
            should_show_skeleton: matches!(state, PageState::Idle | PageState::Loading),
            should_show_error: state == PageState::Error,
            should_show_content: state == PageState::Success,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    target: PageState,
    since_ms: i64,
}

/// Applied state plus at most one pending transition.
#[derive(Clone, Debug, Default)]
pub(crate) struct PageStateMachine {
    applied: PageState,
    pending: Option<Pending>,
    hold_until_ms: Option<i64>,
}

impl PageStateMachine {
    #[cfg(test)]
    pub fn applied(&self) -> PageState {
        self.applied
    }

    /// Feeds the latest inputs; a changed target restarts the settle window.
    pub fn observe(&mut self, inputs: &ReconcileInputs, now_ms: i64) {
        let target = target_state(inputs, self.applied);

        if target == self.applied {
            self.pending = None;
            return;
        }

        match self.pending {
            Some(p) if p.target == target => {}
            _ => {
                self.pending = Some(Pending {
                    target,
                    since_ms: now_ms,
                })
            }
        }
    }

    /// Advances timers; returns true when anything moved.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        let before = (self.applied, self.pending, self.hold_until_ms);
        if let Some(p) = self.pending {
            if now_ms >= p.since_ms + SETTLE_DELAY_MS {
                self.applied = p.target;
                self.pending = None;
                self.hold_until_ms = Some(now_ms + TRANSITION_HOLD_MS);
            }
        }
        if self.hold_until_ms.is_some_and(|until| now_ms >= until) {
            self.hold_until_ms = None;
        }
        before != (self.applied, self.pending, self.hold_until_ms)
    }

    /// When `tick` next needs to run.
    pub fn next_deadline(&self) -> Option<i64> {
        let settle = self.pending.map(|p| p.since_ms + SETTLE_DELAY_MS);
        match (settle, self.hold_until_ms) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn view(&self, now_ms: i64) -> PageView {
        let holding = self.hold_until_ms.is_some_and(|until| now_ms < until);
        PageView::new(self.applied, self.pending.is_some() || holding)
    }
}

/// Reconciles fetch signals into a flicker-free page view.
pub(crate) fn use_page_state(inputs: Signal<ReconcileInputs>) -> ReadSignal<PageView> {
    let (view, set_view) = signal(PageView::default());
    let machine: StoredValue<PageStateMachine> = StoredValue::new(PageStateMachine::default());
    let timer: StoredValue<Option<TimeoutHandle>> = StoredValue::new(None);

    fn drive(
        machine: StoredValue<PageStateMachine>,
        timer: StoredValue<Option<TimeoutHandle>>,
        set_view: WriteSignal<PageView>,
    ) {
        let now = now_ms();
        let Some((next_view, deadline)) = machine.try_update_value(|m| {
            m.tick(now);
            (m.view(now), m.next_deadline())
        }) else {
            return;
        };
        set_if_changed(set_view, next_view);

        if let Some(h) = timer.get_value() {
            h.clear();
        }
        timer.set_value(None);

        if let Some(due) = deadline {
            let wait = (due - now).max(0) as u64;
            let handle = set_timeout_with_handle(
                move || {
                    timer.set_value(None);
                    drive(machine, timer, set_view);
                },
                Duration::from_millis(wait),
            );
            timer.set_value(handle.ok());
        }
    }

    Effect::new(move |_| {
        let current = inputs.get();
        machine.update_value(|m| m.observe(&current, now_ms()));
        drive(machine, timer, set_view);
    });

    on_cleanup(move || {
        if let Some(h) = timer.try_get_value().flatten() {
            h.clear();
        }
    });

    view
}
