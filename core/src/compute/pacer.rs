use std::time::Duration;

/// Voluntary yield schedule for long-running workers.
///
/// A worker calls [`tick()`](YieldPacer::tick) after every unit of work.
/// Every `interval` ticks the pacer gives the rest of the process a chance to
/// run, either by yielding the thread or by sleeping for a short duration.
///
/// Yielding is never a cancellation point. Workers check their
/// [`CancellationToken`](super::CancellationToken) separately.
///
/// # Example
///
/// ```ignore
/// let mut pacer = YieldPacer::new(64).with_sleep(Duration::from_micros(200));
/// for pixel in region.pixels() {
///     paint(pixel);
///     pacer.tick();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct YieldPacer {
    /// Ticks between yields. Zero disables yielding.
    interval: u32,
    /// Sleep instead of a bare `yield_now` when set.
    sleep: Option<Duration>,
    /// Ticks since the last yield.
    pending: u32,
    /// Total yields performed.
    yields: u64,
}

impl YieldPacer {
    /// Creates a pacer that yields the thread every `interval` ticks.
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            sleep: None,
            pending: 0,
            yields: 0,
        }
    }

    /// Creates a pacer that never yields.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Sleep for `duration` at each yield point instead of yielding.
    #[must_use]
    pub fn with_sleep(mut self, duration: Duration) -> Self {
        self.sleep = (!duration.is_zero()).then_some(duration);
        self
    }

    /// Returns whether this pacer ever yields.
    pub fn is_enabled(&self) -> bool {
        self.interval > 0
    }

    /// Total number of yields performed so far.
    pub fn yields(&self) -> u64 {
        self.yields
    }

    /// Records one unit of work and yields if the interval has elapsed.
    ///
    /// Returns `true` if this tick yielded.
    pub fn tick(&mut self) -> bool {
        if self.interval == 0 {
            return false;
        }
        self.pending += 1;
        if self.pending < self.interval {
            return false;
        }
        self.pending = 0;
        self.yields += 1;
        match self.sleep {
            Some(duration) => std::thread::sleep(duration),
            None => std::thread::yield_now(),
        }
        true
    }
}

impl Default for YieldPacer {
    fn default() -> Self {
        Self::new(1)
    }
}
