//! Explicit job classification.
//!
//! The original sin of loop-based runtimes is guessing at dispatch
//! time whether a callable blocks. Here the caller states it up front:
//! every unit of work is one of three [`Job`] kinds, and the control
//! loop dispatches on the tag alone.

use super::LoopCtx;
use std::future::Future;
use std::pin::Pin;

/// A unit of schedulable asynchronous work.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A callback safe to run inline on the control loop.
pub type InlineFn = Box<dyn FnOnce(&mut LoopCtx<'_>) + Send + 'static>;

/// A plain blocking call, destined for the blocking pool.
pub type BlockingFn = Box<dyn FnOnce() + Send + 'static>;

/// A unit of work, classified by the caller.
///
/// | Kind | Runs | Tracked |
/// |------|------|---------|
/// | [`Inline`](Job::Inline) | synchronously on the control loop | never |
/// | [`Task`](Job::Task) | as a spawned task | while tracking is on |
/// | [`Blocking`](Job::Blocking) | on the blocking pool | while tracking is on |
///
/// Inline callbacks must not block: they run on the loop itself and
/// stall every other job while they execute. They receive a
/// [`LoopCtx`] so dispatch decisions made inline (event fan-out, wire
/// fan-out) can spawn follow-up work without another trip through the
/// command channel.
pub enum Job {
    /// Non-blocking callback, invoked synchronously on the loop.
    Inline(InlineFn),
    /// Schedulable unit, spawned onto the async runtime.
    Task(TaskFuture),
    /// Blocking call, dispatched to the blocking pool.
    Blocking(BlockingFn),
}

impl Job {
    /// Wraps a non-blocking callback.
    pub fn inline(f: impl FnOnce(&mut LoopCtx<'_>) + Send + 'static) -> Self {
        Self::Inline(Box::new(f))
    }

    /// Wraps a future.
    pub fn task(fut: impl Future<Output = ()> + Send + 'static) -> Self {
        Self::Task(Box::pin(fut))
    }

    /// Wraps a blocking call.
    pub fn blocking(f: impl FnOnce() + Send + 'static) -> Self {
        Self::Blocking(Box::new(f))
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Job::Inline"),
            Self::Task(_) => f.write_str("Job::Task"),
            Self::Blocking(_) => f.write_str("Job::Blocking"),
        }
    }
}
