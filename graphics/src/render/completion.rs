//! One-shot completion signal from the render worker to its controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Terminal outcome of a render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOutcome {
    /// Every pixel of the region was written.
    Completed,
    /// The worker stopped at a cancellation check.
    Cancelled,
    /// The worker hit an error and stopped.
    Failed,
}

impl RenderOutcome {
    const PENDING: u8 = 0;

    fn to_raw(self) -> u8 {
        match self {
            Self::Completed => 1,
            Self::Cancelled => 2,
            Self::Failed => 3,
        }
    }

    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Completed),
            2 => Some(Self::Cancelled),
            3 => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RenderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One-shot, idempotent end-of-render notification.
///
/// The worker signals it when it reaches a terminal state. Only the first
/// [`signal()`](Self::signal) is accepted; later calls, with any outcome,
/// are ignored. Cloning creates another handle to the same signal, so the
/// worker and the pipeline each hold one.
///
/// Waiters park on a condition variable until the signal fires.
///
/// # Example
///
/// ```ignore
/// let signal = CompletionSignal::new();
/// let worker_signal = signal.clone();
/// std::thread::spawn(move || {
///     paint();
///     worker_signal.signal(RenderOutcome::Completed);
/// });
///
/// while !signal.is_signaled() {
///     pump_host_events();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    shared: Arc<SignalState>,
}

#[derive(Debug)]
struct SignalState {
    outcome: AtomicU8,
    /// Number of accepted signals. Never exceeds one.
    accepted: AtomicUsize,
    lock: Mutex<()>,
    fired: Condvar,
}

impl CompletionSignal {
    /// Create an unsignaled completion signal.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SignalState {
                outcome: AtomicU8::new(RenderOutcome::PENDING),
                accepted: AtomicUsize::new(0),
                lock: Mutex::new(()),
                fired: Condvar::new(),
            }),
        }
    }

    /// Signal completion with `outcome`.
    ///
    /// Returns `true` if this call was the first and was accepted.
    pub fn signal(&self, outcome: RenderOutcome) -> bool {
        // Held across the store so a waiter cannot miss the notification
        // between its check and parking.
        let _guard = self.shared.lock.lock();
        let accepted = self
            .shared
            .outcome
            .compare_exchange(
                RenderOutcome::PENDING,
                outcome.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if accepted {
            self.shared.accepted.fetch_add(1, Ordering::AcqRel);
            self.shared.fired.notify_all();
        }
        accepted
    }

    /// Check if the signal has fired (non-blocking).
    pub fn is_signaled(&self) -> bool {
        self.outcome().is_some()
    }

    /// The accepted outcome, if any.
    pub fn outcome(&self) -> Option<RenderOutcome> {
        RenderOutcome::from_raw(self.shared.outcome.load(Ordering::Acquire))
    }

    /// Number of accepted signals: 0 or 1.
    pub fn accepted_count(&self) -> usize {
        self.shared.accepted.load(Ordering::Acquire)
    }

    /// Block until the signal fires and return its outcome.
    pub fn wait(&self) -> RenderOutcome {
        let mut guard = self.shared.lock.lock();
        loop {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            self.shared.fired.wait(&mut guard);
        }
    }

    /// Wait for the signal with a timeout.
    ///
    /// Returns the outcome, or `None` if the timeout elapsed first. A
    /// timeout too large to represent as a deadline waits indefinitely.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<RenderOutcome> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut guard = self.shared.lock.lock();
        loop {
            if let Some(outcome) = self.outcome() {
                return Some(outcome);
            }
            if self
                .shared
                .fired
                .wait_until(&mut guard, deadline)
                .timed_out()
            {
                return self.outcome();
            }
        }
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
