use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error returned when work is cancelled at a checkpoint.
///
/// Workers that call [`CancellationToken::checkpoint()`] receive this error
/// once the token has been cancelled. They can propagate it with `?` to stop
/// at the next unit of work.
///
/// # Example
///
/// ```ignore
/// for row in rows {
///     token.checkpoint()?;
///     paint(row);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("work cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Token that signals cancellation to cooperative workers.
///
/// Cloning a token creates another handle to the same cancellation flag.
/// Calling [`cancel()`](CancellationToken::cancel) on any clone affects all.
///
/// Cancellation is advisory: setting the flag never blocks and never
/// interrupts a worker. The worker decides when to look at it.
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals cancellation.
    ///
    /// Returns `true` if this call flipped the flag, `false` if the token
    /// was already cancelled.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    /// Returns whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(Cancelled)` if cancellation has been signalled.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
