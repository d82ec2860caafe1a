//! Simulation-thread helpers: tick interval gates and the offload → marshal-back queue.
//!
//! Registry state is only ever touched on the simulation thread. Slow work (disk
//! writes) runs on Tokio's blocking pool and its result comes back as a closure that
//! the simulation thread applies when it calls [`MainThreadQueue::drain`].

use log::warn;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

/// Fires once every `interval_ms` of accumulated tick time.
///
/// A long stall fires once rather than replaying every missed interval.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval_ms: u64,
    accumulated_ms: u64,
}

impl IntervalGate {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            accumulated_ms: 0,
        }
    }

    pub fn advance(&mut self, dt_ms: u64) -> bool {
        self.accumulated_ms = self.accumulated_ms.saturating_add(dt_ms);
        if self.accumulated_ms < self.interval_ms {
            return false;
        }
        self.accumulated_ms %= self.interval_ms;
        true
    }
}

type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Receiving end, owned by the simulation thread.
pub struct MainThreadQueue<S> {
    tx: mpsc::UnboundedSender<Job<S>>,
    rx: mpsc::UnboundedReceiver<Job<S>>,
}

/// Sending end, cheap to clone into background tasks.
pub struct MainThreadHandle<S> {
    tx: mpsc::UnboundedSender<Job<S>>,
}

impl<S> Clone for MainThreadHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> MainThreadHandle<S> {
    /// Queue a closure for the simulation thread. False when the queue is gone.
    pub fn post(&self, job: impl FnOnce(&mut S) + Send + 'static) -> bool {
        self.tx.send(Box::new(job)).is_ok()
    }
}

impl<S> Default for MainThreadQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MainThreadQueue<S> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> MainThreadHandle<S> {
        MainThreadHandle {
            tx: self.tx.clone(),
        }
    }

    /// Apply every queued closure to `state`. Returns how many ran.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job(state);
            ran += 1;
        }
        ran
    }
}

/// Run `work` on the blocking pool and marshal its result back through `handle`.
///
/// Must be called from within a Tokio runtime.
pub fn offload<S, T, W, A>(handle: MainThreadHandle<S>, work: W, apply: A) -> JoinHandle<()>
where
    S: 'static,
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    A: FnOnce(&mut S, Result<T, JoinError>) + Send + 'static,
{
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(work).await;
        if !handle.post(move |state| apply(state, result)) {
            warn!("simulation queue closed; dropping background result");
        }
    })
}
