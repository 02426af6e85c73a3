use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::ProfileRecord;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

pub(crate) const MAX_ATTEMPTS: u32 = 3;
pub(crate) const RETRY_DELAY_MS: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay_ms: RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// `attempts` is the number of attempts already made.
    pub fn should_retry(&self, attempts: u32, err: &ApiError) -> bool {
        err.kind.is_retryable() && attempts < self.max_attempts
    }
}

/// Result of a retried call.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Attempted<T> {
    pub result: ApiResult<T>,
    pub attempts: u32,
}

/// Runs `call` under `policy`, sleeping `policy.delay_ms` between attempts.
///
/// `still_wanted` is checked before every attempt; once it turns false the loop gives up and
/// returns `None`, so a superseded request never issues further calls.
pub(crate) async fn fetch_with_retry<T, C, CFut, S, SFut>(
    policy: RetryPolicy,
    mut call: C,
    mut sleep: S,
    still_wanted: impl Fn() -> bool,
) -> Option<Attempted<T>>
where
    C: FnMut() -> CFut,
    CFut: Future<Output = ApiResult<T>>,
    S: FnMut(u32) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempts = 0;
    loop {
        if !still_wanted() {
            return None;
        }
        attempts += 1;
        let result = call().await;
        match result {
            Err(ref e) if policy.should_retry(attempts, e) => {
                log!(
                    "attempt {attempts}/{} failed ({e}); retrying in {}ms",
                    policy.max_attempts,
                    policy.delay_ms
                );
                sleep(policy.delay_ms).await;
            }
            result => return Some(Attempted { result, attempts }),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum FetchOutcome {
    /// No identifier; nothing requested.
    #[default]
    NotStarted,
    Loading,
    Failed(ApiError),
    Loaded(ProfileRecord),
}

impl FetchOutcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchOutcome::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            FetchOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&ProfileRecord> {
        match self {
            FetchOutcome::Loaded(p) => Some(p),
            _ => None,
        }
    }
}

/// Single-slot request bookkeeping: the newest `begin` owns the slot.
#[derive(Clone, Debug, Default)]
pub(crate) struct FetchSlot {
    request_id: u64,
    key: String,
    outcome: FetchOutcome,
}

impl FetchSlot {
    /// Starts a request for `key`; returns its id, or `None` when `key` is blank.
    pub fn begin(&mut self, key: &str) -> Option<u64> {
        self.request_id = self.request_id.saturating_add(1);
        self.key = key.trim().to_string();
        if self.key.is_empty() {
            self.outcome = FetchOutcome::NotStarted;
            return None;
        }
        self.outcome = FetchOutcome::Loading;
        Some(self.request_id)
    }

    pub fn is_current(&self, request_id: u64) -> bool {
        self.request_id == request_id
    }

    /// Applies a result; stale ids are ignored. Returns whether it was applied.
    pub fn resolve(&mut self, request_id: u64, result: ApiResult<ProfileRecord>) -> bool {
        if !self.is_current(request_id) {
            return false;
        }
        self.outcome = match result {
            Ok(p) => FetchOutcome::Loaded(p),
            Err(e) => FetchOutcome::Failed(e),
        };
        true
    }

    /// Invalidates the in-flight request (view teardown).
    pub fn abandon(&mut self) {
        self.request_id = self.request_id.saturating_add(1);
    }

    #[cfg(test)]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn outcome(&self) -> &FetchOutcome {
        &self.outcome
    }
}

/// Last profile and last error the fetcher produced.
///
/// The page keeps showing these while the reconciler still holds the previous state, so a
/// refetch never blanks the card before the new state is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Retained {
    pub profile: Option<ProfileRecord>,
    pub error: Option<ApiError>,
}

impl Retained {
    pub fn absorb(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Loaded(p) => self.profile = Some(p.clone()),
            FetchOutcome::Failed(e) => self.error = Some(e.clone()),
            FetchOutcome::NotStarted | FetchOutcome::Loading => {}
        }
    }
}

/// Reactive view of the profile fetch for the current settled identifier.
#[derive(Clone, Copy)]
pub(crate) struct ProfileFetchState {
    pub outcome: ReadSignal<FetchOutcome>,
    pub retained: Memo<Retained>,
}

impl ProfileFetchState {
    pub fn is_loading(&self) -> Signal<bool> {
        let outcome = self.outcome;
        Signal::derive(move || outcome.with(|o| o.is_loading()))
    }

    pub fn error(&self) -> Signal<Option<ApiError>> {
        let outcome = self.outcome;
        Signal::derive(move || outcome.with(|o| o.error().cloned()))
    }

    pub fn last_profile(&self) -> Signal<Option<ProfileRecord>> {
        let retained = self.retained;
        Signal::derive(move || retained.with(|r| r.profile.clone()))
    }

    pub fn last_error(&self) -> Signal<Option<ApiError>> {
        let retained = self.retained;
        Signal::derive(move || retained.with(|r| r.error.clone()))
    }
}

/// Fetches the profile named by `settled` whenever it changes.
pub(crate) fn use_profile_fetch(settled: Signal<String>, api: ApiClient) -> ProfileFetchState {
    let (outcome, set_outcome) = signal(FetchOutcome::NotStarted);
    let slot: StoredValue<FetchSlot> = StoredValue::new(FetchSlot::default());
    let policy = RetryPolicy::default();

    Effect::new(move |_| {
        let id = settled.get();
        let Some(req_id) = slot.try_update_value(|s| s.begin(&id)).flatten() else {
            set_outcome.set(FetchOutcome::NotStarted);
            return;
        };
        set_outcome.set(FetchOutcome::Loading);

        let api = api.clone();
        spawn_local(async move {
            let still_wanted =
                move || slot.try_with_value(|s| s.is_current(req_id)).unwrap_or(false);

            let attempted = fetch_with_retry(
                policy,
                || api.get_profile(&id),
                |ms| gloo_timers::future::TimeoutFuture::new(ms),
                still_wanted,
            )
            .await;

            // Superseded or torn down while retrying.
            let Some(Attempted { result, attempts }) = attempted else {
                return;
            };

            if let Err(e) = &result {
                warn!("profile {id:?} failed after {attempts} attempt(s): {e}");
            }

            let applied = slot
                .try_update_value(|s| {
                    s.resolve(req_id, result)
                        .then(|| s.outcome().clone())
                })
                .flatten();
            if let Some(next) = applied {
                set_outcome.set(next);
            }
        });
    });

    on_cleanup(move || {
        slot.try_update_value(|s| s.abandon());
    });

    let retained = Memo::new(move |prev: Option<&Retained>| {
        let mut next = prev.cloned().unwrap_or_default();
        outcome.with(|o| next.absorb(o));
        next
    });

    ProfileFetchState { outcome, retained }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    fn profile(name: &str) -> ProfileRecord {
        ProfileRecord {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Fake sleep that records requested delays and advances a virtual clock.
    struct Clock {
        now: Cell<u64>,
        sleeps: RefCell<Vec<u32>>,
    }

    impl Clock {
        fn new() -> Self {
            Self {
                now: Cell::new(0),
                sleeps: RefCell::new(vec![]),
            }
        }

        fn sleep(&self, ms: u32) -> std::future::Ready<()> {
            self.sleeps.borrow_mut().push(ms);
            self.now.set(self.now.get() + ms as u64);
            std::future::ready(())
        }
    }

    #[test]
    fn test_not_found_is_not_retried() {
        let clock = Clock::new();
        let calls = Cell::new(0);
        let out = block_on(fetch_with_retry(
            RetryPolicy::default(),
            || {
                calls.set(calls.get() + 1);
                std::future::ready(Err::<ProfileRecord, _>(ApiError::from_status(
                    404,
                    "ghost",
                )))
            },
            |ms| clock.sleep(ms),
            || true,
        ))
        .expect("not superseded");

        assert_eq!(out.attempts, 1);
        assert_eq!(calls.get(), 1);
        assert!(clock.sleeps.borrow().is_empty());
        assert_eq!(
            out.result.expect_err("should fail").kind,
            ApiErrorKind::NotFound
        );
    }

    #[test]
    fn test_server_error_retries_up_to_three_attempts_spaced_by_delay() {
        let clock = Clock::new();
        let call_times = RefCell::new(vec![]);
        let out = block_on(fetch_with_retry(
            RetryPolicy::default(),
            || {
                call_times.borrow_mut().push(clock.now.get());
                std::future::ready(Err::<ProfileRecord, _>(ApiError::from_status(
                    503, "alice",
                )))
            },
            |ms| clock.sleep(ms),
            || true,
        ))
        .expect("not superseded");

        assert_eq!(out.attempts, 3);
        assert_eq!(*call_times.borrow(), vec![0, 1000, 2000]);
        assert_eq!(*clock.sleeps.borrow(), vec![1000, 1000]);
        assert_eq!(
            out.result.expect_err("should fail").kind,
            ApiErrorKind::ServerError
        );
    }

    #[test]
    fn test_recovers_after_transient_failure() {
        let clock = Clock::new();
        let calls = Cell::new(0);
        let out = block_on(fetch_with_retry(
            RetryPolicy::default(),
            || {
                calls.set(calls.get() + 1);
                let r = if calls.get() == 1 {
                    Err(ApiError::from_status(429, "alice"))
                } else {
                    Ok(profile("alice"))
                };
                std::future::ready(r)
            },
            |ms| clock.sleep(ms),
            || true,
        ))
        .expect("not superseded");

        assert_eq!(out.attempts, 2);
        assert_eq!(out.result, Ok(profile("alice")));
    }

    #[test]
    fn test_data_errors_are_retried() {
        let calls = Cell::new(0);
        let out = block_on(fetch_with_retry(
            RetryPolicy::default(),
            || {
                calls.set(calls.get() + 1);
                std::future::ready(Err::<ProfileRecord, _>(ApiError::data("bad envelope")))
            },
            |_| std::future::ready(()),
            || true,
        ))
        .expect("not superseded");
        assert_eq!(out.attempts, MAX_ATTEMPTS);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_superseded_request_stops_retrying() {
        let calls = Cell::new(0);
        let out = block_on(fetch_with_retry(
            RetryPolicy::default(),
            || {
                calls.set(calls.get() + 1);
                std::future::ready(Err::<ProfileRecord, _>(ApiError::from_status(500, "x")))
            },
            |_| std::future::ready(()),
            || calls.get() < 1,
        ));
        assert!(out.is_none());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_should_retry_respects_budget() {
        let p = RetryPolicy::default();
        let e = ApiError::from_status(500, "x");
        assert!(p.should_retry(1, &e));
        assert!(p.should_retry(2, &e));
        assert!(!p.should_retry(3, &e));
        assert!(!p.should_retry(1, &ApiError::from_status(404, "x")));
    }

    #[test]
    fn test_blank_identifier_does_not_start_a_request() {
        let mut slot = FetchSlot::default();
        assert_eq!(slot.begin(""), None);
        assert_eq!(slot.begin("   "), None);
        assert_eq!(slot.outcome(), &FetchOutcome::NotStarted);
    }

    #[test]
    fn test_stale_response_does_not_overwrite_newer_request() {
        let mut slot = FetchSlot::default();
        let alice = slot.begin("alice").expect("alice starts");
        let bob = slot.begin("bob").expect("bob starts");
        assert_eq!(slot.key(), "bob");
        assert_eq!(slot.outcome(), &FetchOutcome::Loading);

        // alice resolves late.
        assert!(!slot.resolve(alice, Ok(profile("alice"))));
        assert_eq!(slot.outcome(), &FetchOutcome::Loading);

        assert!(slot.resolve(bob, Ok(profile("bob"))));
        assert_eq!(slot.outcome().data(), Some(&profile("bob")));
    }

    #[test]
    fn test_stale_error_does_not_overwrite_newer_success() {
        let mut slot = FetchSlot::default();
        let alice = slot.begin("alice").expect("alice starts");
        let bob = slot.begin("bob").expect("bob starts");
        assert!(slot.resolve(bob, Ok(profile("bob"))));
        assert!(!slot.resolve(alice, Err(ApiError::from_status(500, "alice"))));
        assert!(slot.outcome().error().is_none());
    }

    #[test]
    fn test_abandon_discards_in_flight_result() {
        let mut slot = FetchSlot::default();
        let id = slot.begin("alice").expect("starts");
        slot.abandon();
        assert!(!slot.resolve(id, Ok(profile("alice"))));
    }

    #[test]
    fn test_clearing_identifier_supersedes_in_flight_request() {
        let mut slot = FetchSlot::default();
        let id = slot.begin("alice").expect("starts");
        assert_eq!(slot.begin(""), None);
        assert!(!slot.resolve(id, Ok(profile("alice"))));
        assert_eq!(slot.outcome(), &FetchOutcome::NotStarted);
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(FetchOutcome::Loading.is_loading());
        let failed = FetchOutcome::Failed(ApiError::from_status(404, "x"));
        assert!(failed.error().is_some_and(|e| e.is_not_found()));
        assert!(failed.data().is_none());
        assert!(!FetchOutcome::NotStarted.is_loading());
    }

    #[test]
    fn test_retained_survives_refetch() {
        let mut slot = FetchSlot::default();
        let mut shown = Retained::default();

        let alice = slot.begin("alice").expect("alice starts");
        shown.absorb(slot.outcome());
        assert_eq!(shown.profile, None);
        slot.resolve(alice, Ok(profile("alice")));
        shown.absorb(slot.outcome());

        // bob is loading: alice stays on the card until the page state moves on.
        slot.begin("bob").expect("bob starts");
        shown.absorb(slot.outcome());
        assert_eq!(shown.profile, Some(profile("alice")));

        assert_eq!(slot.begin(""), None);
        shown.absorb(slot.outcome());
        assert_eq!(shown.profile, Some(profile("alice")));
    }

    #[test]
    fn test_retained_error_survives_loading() {
        let mut slot = FetchSlot::default();
        let mut shown = Retained::default();

        let ghost = slot.begin("ghost").expect("starts");
        slot.resolve(ghost, Err(ApiError::from_status(404, "ghost")));
        shown.absorb(slot.outcome());

        slot.begin("ghost2").expect("starts");
        shown.absorb(slot.outcome());
        assert!(slot.outcome().error().is_none());
        assert!(shown.error.as_ref().is_some_and(|e| e.is_not_found()));
    }

    #[test]
    fn test_retained_memo_tracks_outcome() {
        let owner = Owner::new();
        owner.set();

        let (outcome, set_outcome) = signal(FetchOutcome::NotStarted);
        let retained = Memo::new(move |prev: Option<&Retained>| {
            let mut next = prev.cloned().unwrap_or_default();
            outcome.with(|o| next.absorb(o));
            next
        });
        let state = ProfileFetchState { outcome, retained };

        set_outcome.set(FetchOutcome::Loaded(profile("alice")));
        assert_eq!(state.last_profile().get(), Some(profile("alice")));
        set_outcome.set(FetchOutcome::Loading);
        assert!(state.is_loading().get());
        assert_eq!(state.last_profile().get(), Some(profile("alice")));
        set_outcome.set(FetchOutcome::Failed(ApiError::from_status(500, "bob")));
        assert!(state.last_error().get().is_some());
        assert_eq!(state.last_profile().get(), Some(profile("alice")));
    }
}
