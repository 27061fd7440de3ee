// ── Status poller ──
//
// Owns the repeating refresh timer for one dashboard view. Activation
// fires one refresh immediately and then one per period until the
// returned handle is deactivated or dropped. Every request is tagged
// with a monotonically increasing sequence number; a response is applied
// only if its number is higher than the last one applied, so a slow,
// superseded request can never overwrite newer data.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::CoreError;
use crate::failure::{DEFAULT_POLL_MESSAGE, Failure, classify_failure};
use crate::model::BusStatus;
use crate::source::StatusSource;

/// What the view currently knows about the bus.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last good snapshot. Kept across failed polls.
    pub snapshot: Option<Arc<BusStatus>>,
    /// Failure of the most recent applied poll, cleared on success.
    pub error: Option<Failure>,
    /// When `snapshot` was applied.
    pub updated_at: Option<DateTime<Utc>>,
    /// Sequence number of the last applied response (0 = none yet).
    pub sequence: u64,
}

impl PollState {
    /// No snapshot has ever been loaded.
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Timer,
    Manual,
}

/// Time-driven status refresher for a single view.
///
/// Cheaply cloneable; clones share state, sequence counter, and the
/// single-activation guard.
pub struct StatusPoller<S> {
    inner: Arc<PollerInner<S>>,
}

impl<S> Clone for StatusPoller<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PollerInner<S> {
    source: S,
    period: Duration,
    /// Last sequence number handed out.
    issued: AtomicU64,
    in_flight: Arc<AtomicUsize>,
    active: AtomicBool,
    state: watch::Sender<PollState>,
}

impl<S: StatusSource> StatusPoller<S> {
    pub fn new(source: S, period: Duration) -> Self {
        let period = if period.is_zero() {
            warn!("zero poll interval requested, using default");
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };
        let (state, _) = watch::channel(PollState::default());

        Self {
            inner: Arc::new(PollerInner {
                source,
                period,
                issued: AtomicU64::new(0),
                in_flight: Arc::new(AtomicUsize::new(0)),
                active: AtomicBool::new(false),
                state,
            }),
        }
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    /// Current state (cloned out of the watch channel).
    pub fn state(&self) -> PollState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes. Only applied responses notify.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    /// Number of requests issued so far.
    pub fn issued(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Whether a timer is currently running for this poller.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Start the refresh timer.
    ///
    /// Fails with [`CoreError::PollerAlreadyActive`] if a handle from an
    /// earlier activation is still alive: one timer per view.
    pub fn activate(&self) -> Result<PollerHandle<S>, CoreError> {
        if self.inner.active.swap(true, Ordering::SeqCst) {
            return Err(CoreError::PollerAlreadyActive);
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_task(self.clone(), cancel.clone()));
        info!(
            period_secs = self.inner.period.as_secs(),
            "status poller activated"
        );

        Ok(PollerHandle {
            poller: self.clone(),
            cancel,
            task: Some(task),
        })
    }

    /// Issue one request unless this is a timer tick and another request
    /// is still outstanding. Returns the request's sequence number.
    fn spawn_refresh(&self, trigger: Trigger, cancel: &CancellationToken) -> Option<u64> {
        if cancel.is_cancelled() {
            return None;
        }
        if trigger == Trigger::Timer && self.inner.in_flight.load(Ordering::SeqCst) > 0 {
            debug!("refresh still in flight, skipping timer tick");
            return None;
        }

        let seq = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = InFlight::enter(&self.inner.in_flight);
        debug!(seq, ?trigger, "issuing status refresh");

        tokio::spawn(fetch(self.clone(), seq, cancel.child_token(), guard));
        Some(seq)
    }

    /// Apply a completed response if it is newer than what is displayed.
    fn apply(&self, seq: u64, result: Result<BusStatus, CoreError>) -> bool {
        self.inner.state.send_if_modified(|state| {
            if seq <= state.sequence {
                debug!(seq, applied = state.sequence, "discarding stale status response");
                return false;
            }
            state.sequence = seq;
            match result {
                Ok(status) => {
                    state.snapshot = Some(Arc::new(status));
                    state.error = None;
                    state.updated_at = Some(Utc::now());
                }
                Err(e) => {
                    warn!(seq, error = %e, "status poll failed");
                    state.error = Some(classify_failure(&e, DEFAULT_POLL_MESSAGE));
                }
            }
            true
        })
    }
}

/// Live activation of a [`StatusPoller`].
///
/// Dropping the handle cancels the timer and any outstanding request, so
/// teardown happens on every exit path.
pub struct PollerHandle<S: StatusSource> {
    poller: StatusPoller<S>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<S: StatusSource> PollerHandle<S> {
    /// Manual refresh: immediate, independent of the timer, which keeps
    /// its schedule.
    pub fn refresh(&self) -> Option<u64> {
        self.poller.spawn_refresh(Trigger::Manual, &self.cancel)
    }

    pub fn poller(&self) -> &StatusPoller<S> {
        &self.poller
    }

    /// Stop the timer and wait for the poll task to exit.
    pub async fn deactivate(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn shutdown(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.poller.inner.active.store(false, Ordering::SeqCst);
        info!("status poller deactivated");
    }
}

impl<S: StatusSource> Drop for PollerHandle<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decrements the in-flight counter when a request finishes or is dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn fetch<S: StatusSource>(
    poller: StatusPoller<S>,
    seq: u64,
    cancel: CancellationToken,
    _in_flight: InFlight,
) {
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(seq, "refresh abandoned, poller deactivated");
            return;
        }
        result = poller.inner.source.read_status() => result,
    };
    if cancel.is_cancelled() {
        return;
    }
    poller.apply(seq, result);
}

/// Drive refreshes from the interval until cancelled. The first tick
/// completes immediately, giving the activation refresh.
async fn poll_task<S: StatusSource>(poller: StatusPoller<S>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(poller.inner.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                poller.spawn_refresh(Trigger::Timer, &cancel);
            }
        }
    }
    debug!("status poll task stopped");
}
