//! Cooperative compute primitives.
//!
//! Building blocks for workers that run on their own thread and must stay
//! responsive to the thread that owns them:
//!
//! - [`CancellationToken`] - Shared, advisory stop flag
//! - [`Cancelled`] - Error returned by [`CancellationToken::checkpoint`]
//! - [`YieldPacer`] - Voluntary yield schedule between units of work

mod cancellation;
mod pacer;

pub use cancellation::{CancellationToken, Cancelled};
pub use pacer::YieldPacer;
