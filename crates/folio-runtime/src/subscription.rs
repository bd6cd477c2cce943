#![forbid(unsafe_code)]

//! Declarative timer subscriptions.
//!
//! `Model::subscriptions()` returns the timers the model currently wants.
//! After every update the runtime diffs that set by [`SubId`]: new ids are
//! started, ids no longer declared are stopped, and unchanged ids keep
//! running undisturbed. Cancelling a pending timer is therefore just a matter
//! of no longer declaring it.
//!
//! Each subscription exposes its [`Schedule`] so that the simulator can drive
//! it from virtual time; the live runtime runs it on a background thread.

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

/// Identifies a subscription across reconciliations.
pub type SubId = u64;

/// When a subscription fires, relative to when it was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Fire once after the delay, then stay idle until undeclared.
    Once(Duration),
    /// Fire repeatedly at a fixed interval.
    Every(Duration),
}

impl Schedule {
    pub fn interval(&self) -> Duration {
        match self {
            Schedule::Once(d) | Schedule::Every(d) => *d,
        }
    }

    pub fn is_repeating(&self) -> bool {
        matches!(self, Schedule::Every(_))
    }
}

/// A timer that produces messages.
pub trait Subscription<M: Send + 'static>: Send {
    /// Subscriptions with equal ids are considered the same timer.
    fn id(&self) -> SubId;

    fn schedule(&self) -> Schedule;

    /// Build the message delivered when the timer fires.
    fn fire(&self) -> M;

    /// Background-thread body used by the live runtime.
    ///
    /// Exits when stopped or when the receiver is gone.
    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        match self.schedule() {
            Schedule::Once(delay) => {
                if !stop.wait_timeout(delay) {
                    let _ = sender.send(self.fire());
                }
            }
            Schedule::Every(interval) => {
                let interval = interval.max(Duration::from_millis(1));
                while !stop.wait_timeout(interval) {
                    if sender.send(self.fire()).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Stop flag shared between the runtime and a subscription thread.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            StopTrigger { inner },
        )
    }

    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block until stopped or `duration` elapses. Returns `true` if stopped.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(|e| e.into_inner());
        let start = Instant::now();
        loop {
            if *stopped {
                return true;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            let (guard, _) = cvar
                .wait_timeout(stopped, duration - elapsed)
                .unwrap_or_else(|e| e.into_inner());
            stopped = guard;
        }
    }
}

pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        cvar.notify_all();
    }
}

struct RunningSubscription {
    id: SubId,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningSubscription {
    fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunningSubscription {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

/// Runs declared subscriptions on background threads.
pub(crate) struct SubscriptionManager<M: Send + 'static> {
    active: Vec<RunningSubscription>,
    sender: mpsc::Sender<M>,
    receiver: mpsc::Receiver<M>,
}

impl<M: Send + 'static> SubscriptionManager<M> {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            active: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Start newly declared ids and stop ids that are no longer declared.
    pub(crate) fn reconcile(&mut self, subscriptions: Vec<Box<dyn Subscription<M>>>) {
        let declared: HashSet<SubId> = subscriptions.iter().map(|s| s.id()).collect();
        let before = self.active.len();

        let (keep, stale): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|running| declared.contains(&running.id));
        self.active = keep;
        for running in stale {
            tracing::debug!(target: "folio.runtime", sub_id = running.id, "stopping subscription");
            running.stop();
        }

        let mut running_ids: HashSet<SubId> = self.active.iter().map(|r| r.id).collect();
        for sub in subscriptions {
            let id = sub.id();
            if !running_ids.insert(id) {
                continue;
            }
            tracing::debug!(
                target: "folio.runtime",
                sub_id = id,
                schedule = ?sub.schedule(),
                "starting subscription"
            );
            let (signal, trigger) = StopSignal::new();
            let sender = self.sender.clone();
            let thread = thread::spawn(move || sub.run(sender, signal));
            self.active.push(RunningSubscription {
                id,
                trigger,
                thread: Some(thread),
            });
        }

        tracing::trace!(
            target: "folio.runtime",
            before,
            after = self.active.len(),
            "subscriptions reconciled"
        );
    }

    pub(crate) fn drain_messages(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn stop_all(&mut self) {
        for running in self.active.drain(..) {
            running.stop();
        }
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Fires every `interval`.
pub struct Every<M: Send + 'static> {
    id: SubId,
    interval: Duration,
    make_msg: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> Every<M> {
    /// Id derived from the interval, so equal intervals deduplicate.
    pub fn new(interval: Duration, make_msg: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self::with_id(interval.as_nanos() as u64 ^ 0x5449_434B, interval, make_msg)
    }

    pub fn with_id(
        id: SubId,
        interval: Duration,
        make_msg: impl Fn() -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            interval,
            make_msg: Box::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn schedule(&self) -> Schedule {
        Schedule::Every(self.interval)
    }

    fn fire(&self) -> M {
        (self.make_msg)()
    }
}

/// Fires once, `delay` after it is first declared.
///
/// Re-declaring the same id while it is active does not restart the delay;
/// give each logical timer instance a distinct id via [`After::with_id`].
pub struct After<M: Send + 'static> {
    id: SubId,
    delay: Duration,
    make_msg: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> After<M> {
    pub fn new(delay: Duration, make_msg: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self::with_id(delay.as_nanos() as u64 ^ 0x4146_5452, delay, make_msg)
    }

    pub fn with_id(
        id: SubId,
        delay: Duration,
        make_msg: impl Fn() -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            delay,
            make_msg: Box::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for After<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn schedule(&self) -> Schedule {
        Schedule::Once(self.delay)
    }

    fn fire(&self) -> M {
        (self.make_msg)()
    }
}
