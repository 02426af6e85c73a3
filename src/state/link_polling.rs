use crate::api::{ApiClient, ApiError, ApiResult, LinkResponse};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::{set_interval_with_handle, IntervalHandle};
use std::time::Duration;

pub(crate) const DEFAULT_POLL_INTERVAL_MS: u32 = 2000;

/// What one poll produced.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PollEvent {
    Changed(String),
    Unchanged,
    Failed(ApiError),
}

/// Value-level change detection for the shared link slot.
///
/// `in_flight` remembers which poll generation owns the outstanding request, so a late answer
/// from a stopped loop never blocks or resolves the current one.
#[derive(Clone, Debug, Default)]
pub(crate) struct LinkTracker {
    last: String,
    in_flight: Option<u64>,
}

impl LinkTracker {
    /// Claims the next poll; false while an earlier one of the same loop has not resolved.
    pub fn begin(&mut self, generation: u64) -> bool {
        if self.in_flight == Some(generation) {
            return false;
        }
        self.in_flight = Some(generation);
        true
    }

    pub fn observe(&mut self, generation: u64, result: ApiResult<LinkResponse>) -> PollEvent {
        self.release(generation);
        match result {
            Ok(LinkResponse {
                success: true,
                link,
            }) if link != self.last => {
                self.last = link.clone();
                PollEvent::Changed(link)
            }
            Ok(_) => PollEvent::Unchanged,
            Err(e) => PollEvent::Failed(e),
        }
    }

    /// Drops the claim of `generation` without recording a result.
    pub fn release(&mut self, generation: u64) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
    }

    pub fn last(&self) -> &str {
        &self.last
    }
}

/// Recurring timer backend.
pub(crate) trait IntervalScheduler {
    type Handle: Copy;

    fn start_interval(&self, period_ms: u32, tick: Box<dyn Fn()>) -> Option<Self::Handle>;
    fn cancel(&self, handle: Self::Handle);
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserIntervals;

impl IntervalScheduler for BrowserIntervals {
    type Handle = IntervalHandle;

    fn start_interval(&self, period_ms: u32, tick: Box<dyn Fn()>) -> Option<IntervalHandle> {
        set_interval_with_handle(tick, Duration::from_millis(period_ms as u64)).ok()
    }

    fn cancel(&self, handle: IntervalHandle) {
        handle.clear();
    }
}

/// One polling loop at most. Each start/stop bumps `generation` so late results can be told
/// apart from the current loop's.
pub(crate) struct PollSession<S: IntervalScheduler> {
    scheduler: S,
    interval_ms: u32,
    handle: Option<S::Handle>,
    generation: u64,
}

impl<S: IntervalScheduler> PollSession<S> {
    pub fn new(scheduler: S, interval_ms: u32) -> Self {
        Self {
            scheduler,
            interval_ms,
            handle: None,
            generation: 0,
        }
    }

    /// Restarts the loop: polls once right away, then every `interval_ms`.
    pub fn start(&mut self, tick: impl Fn(u64) + 'static) -> u64 {
        self.stop();
        let generation = self.generation;
        tick(generation);
        self.handle = self
            .scheduler
            .start_interval(self.interval_ms, Box::new(move || tick(generation)));
        generation
    }

    pub fn stop(&mut self) {
        if let Some(h) = self.handle.take() {
            self.scheduler.cancel(h);
        }
        self.generation = self.generation.saturating_add(1);
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.generation == generation
    }
}

/// Tagged status of the shared link, for presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum LinkStatus {
    #[default]
    Waiting,
    Linked {
        link: String,
    },
    /// Last poll failed; dependent markers are reset.
    Unavailable,
}

/// Browser-side link poller.
///
/// Owns the interval and the last seen link (inside the tracker). Change and error callbacks are invoked from the
/// event loop; polling keeps going after failures.
#[derive(Clone)]
pub(crate) struct LinkPollingController<S = BrowserIntervals>
where
    S: IntervalScheduler + Send + Sync + 'static,
    S::Handle: Send + Sync,
{
    api: ApiClient,
    tracker: StoredValue<LinkTracker>,
    session: StoredValue<PollSession<S>>,

    is_polling: RwSignal<bool>,
    status: RwSignal<LinkStatus>,

    on_link_change: Callback<String>,
    on_error: Callback<ApiError>,
}

impl LinkPollingController {
    pub fn new(
        api: ApiClient,
        interval_ms: u32,
        on_link_change: Callback<String>,
        on_error: Callback<ApiError>,
    ) -> Self {
        Self::with_scheduler(BrowserIntervals, api, interval_ms, on_link_change, on_error)
    }
}

impl<S> LinkPollingController<S>
where
    S: IntervalScheduler + Clone + Send + Sync + 'static,
    S::Handle: Send + Sync,
{
    pub fn with_scheduler(
        scheduler: S,
        api: ApiClient,
        interval_ms: u32,
        on_link_change: Callback<String>,
        on_error: Callback<ApiError>,
    ) -> Self {
        let s = Self {
            api,
            tracker: StoredValue::new(LinkTracker::default()),
            session: StoredValue::new(PollSession::new(scheduler, interval_ms)),
            is_polling: RwSignal::new(false),
            status: RwSignal::new(LinkStatus::Waiting),
            on_link_change,
            on_error,
        };

        let s2 = s.clone();
        on_cleanup(move || s2.teardown());
        s
    }

    pub fn is_polling(&self) -> ReadSignal<bool> {
        self.is_polling.read_only()
    }

    pub fn status(&self) -> ReadSignal<LinkStatus> {
        self.status.read_only()
    }

    pub fn start(&self) {
        let s2 = self.clone();
        self.session.update_value(|session| {
            session.start(move |generation| s2.poll_once(generation));
        });
        self.is_polling.set(true);
    }

    pub fn stop(&self) {
        self.session.update_value(|session| session.stop());
        self.is_polling.set(false);
    }

    fn teardown(&self) {
        self.session.try_update_value(|session| session.stop());
    }

    fn poll_once(&self, generation: u64) {
        // Overlap policy: skip the tick while the previous request is outstanding.
        if !self
            .tracker
            .try_update_value(|t| t.begin(generation))
            .unwrap_or(false)
        {
            return;
        }

        let api = self.api.clone();
        let s2 = self.clone();
        spawn_local(async move {
            let result = api.get_link().await;
            s2.apply(generation, result);
        });
    }

    fn apply(&self, generation: u64, result: ApiResult<LinkResponse>) {
        let current = self
            .session
            .try_with_value(|session| session.is_current(generation))
            .unwrap_or(false);
        if !current {
            self.tracker.try_update_value(|t| t.release(generation));
            return;
        }

        let Some(event) = self
            .tracker
            .try_update_value(|t| t.observe(generation, result)) else {
            return;
        };

        match event {
            PollEvent::Changed(link) => {
                self.status.set(status_for_link(&link));
                self.on_link_change.run(link);
            }
            PollEvent::Unchanged => {
                // Recovered after a failure.
                if self.status.get_untracked() == LinkStatus::Unavailable {
                    let last = self.tracker.with_value(|t| t.last().to_string());
                    self.status.set(status_for_link(&last));
                }
            }
            PollEvent::Failed(e) => {
                warn!("link poll failed: {e}");
                self.status.set(LinkStatus::Unavailable);
                self.on_error.run(e);
            }
        }
    }
}

pub(crate) fn status_for_link(link: &str) -> LinkStatus {
    if link.trim().is_empty() {
        LinkStatus::Waiting
    } else {
        LinkStatus::Linked {
            link: link.to_string(),
        }
    }
}
