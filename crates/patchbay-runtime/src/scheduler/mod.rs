//! Job scheduler - the single authority for all units of work.
//!
//! The runtime funnels every callback, task and blocking call through
//! one **control loop**: a dedicated task that owns the pending-task
//! set and makes every dispatch decision. Work arrives over a command
//! channel, so submission is safe from any thread while the loop-owned
//! state needs no locks at all.
//!
//! ```text
//!  any thread / task                     control loop task
//! ┌──────────────────┐   mpsc commands  ┌───────────────────────────┐
//! │ Scheduler handle ├─────────────────►│ dispatch:                 │
//! │  submit / drain  │                  │   Inline   → run in place │
//! │  create_task     │◄─────────────────┤   Task     → tokio::spawn │
//! └──────────────────┘ oneshot replies  │   Blocking → spawn_blocking│
//!                                       │ pending: Vec<JoinHandle>  │
//!                                       └───────────────────────────┘
//! ```
//!
//! # Tracking
//!
//! Tracked tasks are recorded in the pending set so [`Scheduler::drain`]
//! can wait for them. Tracking is on at boot (so startup work can be
//! drained) and disabled for steady-state traffic, keeping the pending
//! set from growing without bound. [`Scheduler::create_task`] and
//! [`Scheduler::submit_blocking`] track unconditionally.
//!
//! # Ordering
//!
//! Commands from one sender are processed in submission order. No
//! relative order is guaranteed between different senders.

mod job;

pub use job::{BlockingFn, InlineFn, Job, TaskFuture};

use std::future::Future;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

enum Command {
    Submit(Job),
    CreateTask(TaskFuture),
    SubmitBlocking(BlockingFn),
    SetTracking(bool),
    Drain(oneshot::Sender<()>),
    Stop(i32),
}

/// State owned exclusively by the control loop task.
///
/// There is deliberately no way to reach this from outside the loop:
/// the "must run on the control thread" precondition is enforced by
/// ownership, not by a runtime check.
struct LoopState {
    pending: Vec<JoinHandle<()>>,
    tracking: bool,
}

impl LoopState {
    fn dispatch(&mut self, job: Job) {
        match job {
            Job::Inline(f) => {
                let mut ctx = LoopCtx { state: self };
                f(&mut ctx);
            }
            Job::Task(fut) => self.spawn_task(fut, self.tracking),
            Job::Blocking(f) => self.spawn_blocking(f, self.tracking),
        }
    }

    fn spawn_task(&mut self, fut: TaskFuture, track: bool) {
        let handle = tokio::spawn(fut);
        if track {
            self.pending.push(handle);
        }
    }

    fn spawn_blocking(&mut self, f: BlockingFn, track: bool) {
        let handle = tokio::task::spawn_blocking(f);
        if track {
            self.pending.push(handle);
        }
    }
}

/// Dispatch context handed to [`Job::Inline`] callbacks.
///
/// Lets inline work spawn follow-up jobs with immediate effect - the
/// spawned task is tracked (or not) under the tracking flag as it is
/// *right now*, not as it will be when a round-trip through the
/// command channel completes.
pub struct LoopCtx<'a> {
    state: &'a mut LoopState,
}

impl LoopCtx<'_> {
    /// Dispatches a job immediately.
    pub fn submit(&mut self, job: Job) {
        self.state.dispatch(job);
    }

    /// Spawns a task that is tracked regardless of the tracking flag.
    pub fn create_task(&mut self, fut: impl Future<Output = ()> + Send + 'static) {
        self.state.spawn_task(Box::pin(fut), true);
    }

    /// Current state of the tracking flag.
    #[must_use]
    pub fn tracking(&self) -> bool {
        self.state.tracking
    }
}

/// The control loop. Spawn [`run`](Self::run) once; everything else
/// goes through the [`Scheduler`] handle.
pub struct ControlLoop {
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    state: LoopState,
    stop_tx: watch::Sender<Option<i32>>,
    stop_code: Option<i32>,
    drain_waiters: Vec<oneshot::Sender<()>>,
}

impl ControlLoop {
    /// Runs until [`Scheduler::stop`] is called or every handle is
    /// dropped. Returns the exit code.
    ///
    /// Production entry points spawn this with [`Scheduler::spawn`];
    /// calling it directly is for test and manual harnesses that want
    /// to own the loop's lifetime.
    pub async fn run(mut self) -> i32 {
        debug!("control loop started");
        while self.stop_code.is_none() {
            let Some(cmd) = self.cmd_rx.recv().await else {
                break;
            };
            if let Command::Drain(done) = cmd {
                self.drain_waiters.push(done);
                self.drain().await;
                for done in self.drain_waiters.drain(..) {
                    let _ = done.send(());
                }
            } else {
                self.apply(cmd);
            }
        }
        let code = self.stop_code.unwrap_or(0);
        let _ = self.stop_tx.send(Some(code));
        debug!(code, "control loop stopped");
        code
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Submit(job) => self.state.dispatch(job),
            Command::CreateTask(fut) => self.state.spawn_task(fut, true),
            Command::SubmitBlocking(f) => self.state.spawn_blocking(f, true),
            Command::SetTracking(on) => self.state.tracking = on,
            Command::Stop(code) => self.stop_code = Some(code),
            Command::Drain(done) => self.drain_waiters.push(done),
        }
    }

    /// Absorbs every command already queued, without waiting.
    fn absorb_queued(&mut self) {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            self.apply(cmd);
        }
    }

    /// Waits until a full cycle finds zero pending tasks and nothing
    /// new was scheduled during the wait.
    async fn drain(&mut self) {
        // Flush submissions racing in from other threads.
        tokio::task::yield_now().await;
        loop {
            self.absorb_queued();
            if self.stop_code.is_some() {
                break;
            }
            let pending: Vec<JoinHandle<()>> = std::mem::take(&mut self.state.pending)
                .into_iter()
                .filter(|handle| !handle.is_finished())
                .collect();
            if pending.is_empty() {
                // One more yield: a task finishing right now may still
                // have a follow-up submission in flight.
                tokio::task::yield_now().await;
                self.absorb_queued();
                if self.state.pending.is_empty() {
                    break;
                }
                continue;
            }
            for handle in pending {
                if let Err(err) = handle.await {
                    warn!(error = %err, "tracked task failed while draining");
                }
            }
        }
    }
}

/// Cheap-clone handle submitting work to the control loop.
///
/// # Example
///
/// ```
/// use patchbay_runtime::scheduler::{Job, Scheduler};
///
/// # #[tokio::main(flavor = "multi_thread")]
/// # async fn main() {
/// let scheduler = Scheduler::spawn();
/// scheduler.submit(Job::task(async {
///     // runs as an independent task
/// }));
/// scheduler.drain().await;
/// # scheduler.stop(0);
/// # }
/// ```
#[derive(Clone)]
pub struct Scheduler {
    cmd_tx: mpsc::UnboundedSender<Command>,
    stop_rx: watch::Receiver<Option<i32>>,
}

impl Scheduler {
    /// Creates a scheduler and its (not yet running) control loop.
    #[must_use]
    pub fn new() -> (Self, ControlLoop) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(None);
        let control = ControlLoop {
            cmd_rx,
            state: LoopState {
                pending: Vec::new(),
                tracking: true,
            },
            stop_tx,
            stop_code: None,
            drain_waiters: Vec::new(),
        };
        (Self { cmd_tx, stop_rx }, control)
    }

    /// Creates a scheduler and spawns its control loop onto the
    /// current runtime.
    #[must_use]
    pub fn spawn() -> Self {
        let (scheduler, control) = Self::new();
        tokio::spawn(control.run());
        scheduler
    }

    /// Submits a job from any thread. Fire-and-forget.
    pub fn submit(&self, job: Job) {
        if self.cmd_tx.send(Command::Submit(job)).is_err() {
            warn!("scheduler stopped, job dropped");
        }
    }

    /// Registers a future as a tracked task, regardless of the
    /// tracking flag.
    pub fn create_task(&self, fut: impl Future<Output = ()> + Send + 'static) {
        if self
            .cmd_tx
            .send(Command::CreateTask(Box::pin(fut)))
            .is_err()
        {
            warn!("scheduler stopped, task dropped");
        }
    }

    /// Forces a callable onto the blocking pool; always tracked.
    pub fn submit_blocking(&self, f: impl FnOnce() + Send + 'static) {
        if self
            .cmd_tx
            .send(Command::SubmitBlocking(Box::new(f)))
            .is_err()
        {
            warn!("scheduler stopped, blocking job dropped");
        }
    }

    /// Toggles whether newly scheduled work joins the pending set.
    pub fn set_tracking(&self, on: bool) {
        let _ = self.cmd_tx.send(Command::SetTracking(on));
    }

    /// Waits until all tracked work - including work scheduled while
    /// waiting - has completed.
    ///
    /// Must not be awaited from inside a tracked job: the loop would
    /// then be waiting on a task that is waiting on the loop.
    pub async fn drain(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Drain(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    /// Stops the control loop. [`wait_stopped`](Self::wait_stopped)
    /// resolves with `code`.
    pub fn stop(&self, code: i32) {
        let _ = self.cmd_tx.send(Command::Stop(code));
    }

    /// Waits until the control loop has stopped; returns the exit code.
    pub async fn wait_stopped(&self) -> i32 {
        let mut stop_rx = self.stop_rx.clone();
        loop {
            if let Some(code) = *stop_rx.borrow_and_update() {
                return code;
            }
            if stop_rx.changed().await.is_err() {
                return 0;
            }
        }
    }

    /// Returns `true` once the control loop has stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop_rx.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_terminates_with_nothing_pending() {
        let scheduler = Scheduler::spawn();
        tokio::time::timeout(Duration::from_secs(1), scheduler.drain())
            .await
            .expect("drain with no pending jobs must not hang");
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn inline_jobs_run_on_the_loop() {
        let scheduler = Scheduler::spawn();
        let (tx, rx) = std::sync::mpsc::channel();
        scheduler.submit(Job::inline(move |_ctx| {
            tx.send(42).unwrap();
        }));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 42);
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_waits_for_tracked_tasks() {
        let scheduler = Scheduler::spawn();
        let done = Arc::new(AtomicUsize::new(0));

        let flag = Arc::clone(&done);
        scheduler.create_task(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_waits_for_blocking_jobs() {
        let scheduler = Scheduler::spawn();
        let done = Arc::new(AtomicUsize::new(0));

        let flag = Arc::clone(&done);
        scheduler.submit_blocking(move || {
            std::thread::sleep(Duration::from_millis(50));
            flag.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_follows_a_chain_of_rescheduling_jobs() {
        const CHAIN: usize = 10;

        let scheduler = Scheduler::spawn();
        let count = Arc::new(AtomicUsize::new(0));

        fn link(scheduler: Scheduler, count: Arc<AtomicUsize>, remaining: usize) {
            if remaining == 0 {
                return;
            }
            let next = scheduler.clone();
            scheduler.create_task(async move {
                count.fetch_add(1, Ordering::SeqCst);
                link(next.clone(), count, remaining - 1);
            });
        }

        link(scheduler.clone(), Arc::clone(&count), CHAIN);
        tokio::time::timeout(Duration::from_secs(5), scheduler.drain())
            .await
            .expect("drain must terminate after the chain ends");
        assert_eq!(count.load(Ordering::SeqCst), CHAIN);
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn untracked_tasks_do_not_block_drain() {
        let scheduler = Scheduler::spawn();
        scheduler.set_tracking(false);

        scheduler.submit(Job::task(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }));

        tokio::time::timeout(Duration::from_secs(1), scheduler.drain())
            .await
            .expect("untracked work must not be waited for");
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_task_ignores_tracking_flag() {
        let scheduler = Scheduler::spawn();
        scheduler.set_tracking(false);

        let done = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&done);
        scheduler.create_task(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn inline_ctx_spawns_are_tracked_immediately() {
        let scheduler = Scheduler::spawn();
        let done = Arc::new(AtomicUsize::new(0));

        let flag = Arc::clone(&done);
        scheduler.submit(Job::inline(move |ctx| {
            ctx.create_task(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.fetch_add(1, Ordering::SeqCst);
            });
        }));

        scheduler.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        scheduler.stop(0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_resolves_waiters_with_exit_code() {
        let scheduler = Scheduler::spawn();
        let waiter = scheduler.clone();
        let joined = tokio::spawn(async move { waiter.wait_stopped().await });

        scheduler.stop(3);
        assert_eq!(joined.await.unwrap(), 3);
        assert!(scheduler.is_stopped());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_returns_exit_code() {
        let (scheduler, control) = Scheduler::new();
        scheduler.stop(7);
        assert_eq!(control.run().await, 7);
    }
}
