use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};

use crate::api::LockApi;
use crate::lock::{Lock, LockStatus};

// ─── Poller ───────────────────────────────────────────────────────────────

/// Background watcher for released locks.
///
/// While running, one Tokio task alternates between a poll cycle and a wait
/// of `period`. A cycle asks the lock service for every `released` lock and
/// hands each one to the handler, sequentially and in service order. The
/// wait starts after the cycle finishes, so discovery latency is bounded by
/// `period` plus the duration of one cycle.
///
/// Failed polls are logged and skipped; the next attempt happens at the next
/// scheduled wake-up. Delivery is at-least-once: a lock whose cleanup fails
/// is reported again on a later cycle.
///
/// ```rust,ignore
/// let poller = Poller::new(Arc::new(client), Duration::from_secs(60));
/// poller.start(|lock| async move { println!("released: {}", lock.id) });
/// // ...
/// poller.stop().await;
/// ```
pub struct Poller<A> {
    api: Arc<A>,
    period: Duration,
    state: Mutex<State>,
}

enum State {
    Idle,
    Running(Running),
    /// Stop signalled; the loop may still be finishing its current cycle.
    Stopping(AbortHandle),
}

impl State {
    /// Whether a poll loop task still exists for this poller.
    fn is_active(&self) -> bool {
        match self {
            State::Idle => false,
            State::Running(r) => !r.handle.is_finished(),
            State::Stopping(task) => !task.is_finished(),
        }
    }
}

/// Handles of an active poll loop: the stop signal and the task to await.
struct Running {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl<A: LockApi + 'static> Poller<A> {
    pub fn new(api: Arc<A>, period: Duration) -> Self {
        Self {
            api,
            period,
            state: Mutex::new(State::Idle),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        matches!(&*self.state(), State::Running(r) if !r.handle.is_finished())
    }

    /// Start polling and deliver released locks to `handler`.
    ///
    /// The first cycle runs immediately. Returns `false` without touching
    /// the active loop when the poller is already running, or when a `stop`
    /// is still waiting for the previous loop to exit; `handler` is dropped
    /// in that case. Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(&self, handler: F) -> bool
    where
        F: Fn(Lock) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state();
        if state.is_active() {
            tracing::debug!("poll loop still active; start ignored");
            return false;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.api),
            self.period,
            handler,
            stop_rx,
        ));
        *state = State::Running(Running { stop_tx, handle });
        tracing::info!(period_secs = self.period.as_secs_f64(), "poller started");
        true
    }

    /// Stop polling and wait for the loop to exit.
    ///
    /// An in-flight poll cycle is never interrupted: the loop observes the
    /// stop request at its next wait, so this returns once the current cycle
    /// (including its handler calls) has completed. A no-op when idle or
    /// when another `stop` is already in progress.
    pub async fn stop(&self) {
        let Some(running) = self.begin_stop() else {
            tracing::debug!("poller not running; stop ignored");
            return;
        };

        let _ = running.stop_tx.send(());
        if let Err(e) = running.handle.await {
            if e.is_panic() {
                tracing::error!("poll loop terminated by a panicking handler: {e}");
            }
        }
        tracing::info!("poller stopped");
    }

    /// Move Running to Stopping and hand back the loop's handles. The
    /// Stopping state outlives this call, so a `start` racing the wait (or
    /// following a cancelled `stop`) cannot spawn a second loop.
    fn begin_stop(&self) -> Option<Running> {
        let mut state = self.state();
        match std::mem::replace(&mut *state, State::Idle) {
            State::Running(running) => {
                *state = State::Stopping(running.handle.abort_handle());
                Some(running)
            }
            other => {
                *state = other;
                None
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ─── Loop ─────────────────────────────────────────────────────────────────

async fn run_loop<A, F, Fut>(
    api: Arc<A>,
    period: Duration,
    handler: F,
    mut stop_rx: oneshot::Receiver<()>,
) where
    A: LockApi,
    F: Fn(Lock) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    loop {
        poll_once(api.as_ref(), &handler).await;

        // A dropped sender (poller dropped without `stop`) also ends the loop.
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = tokio::time::sleep(period) => {}
        }
    }
}

/// Run one poll cycle and return how many locks were handed to `handler`.
pub async fn poll_once<A, F, Fut>(api: &A, handler: &F) -> usize
where
    A: LockApi,
    F: Fn(Lock) -> Fut,
    Fut: Future<Output = ()>,
{
    let locks = match api.get_with_status(&LockStatus::Released).await {
        Ok(locks) => locks,
        Err(e) => {
            tracing::warn!("polling lock service failed, retrying next interval: {e}");
            return 0;
        }
    };

    let count = locks.len();
    tracing::debug!(count, "poll cycle found released locks");
    for lock in locks {
        handler(lock).await;
    }
    count
}

// ─── Tests ────────────────────────────────────────────────────────────────
