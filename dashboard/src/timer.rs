//! Recurring and one-shot timers that hand back a handle.
//!
//! Dropping a [`TimerHandle`] detaches the timer, it keeps running. Only an
//! explicit [`TimerHandle::stop`] cancels it.

use std::{future::Future, time::Duration};

use tokio::{
    task::{JoinHandle, JoinSet},
    time::{self, Instant, MissedTickBehavior},
};

/// `tokio::time::interval` panics on a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancel the timer. For a recurring timer this also cancels every run
    /// that is still in flight.
    pub fn stop(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the timer has fired and its task completed, or until it was
    /// stopped.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!("timer task panicked: {}", e);
            }
        }
    }
}

/// Run `task` every `period`, starting one full period from now.
///
/// Each run is spawned on its own, so a slow run does not hold back the next
/// tick: runs may overlap.
pub fn every<F, Fut>(period: Duration, mut task: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let period = period.max(MIN_PERIOD);

    let handle = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // owned by this task, so aborting the timer aborts the runs too
        let mut running = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    running.spawn(task());
                }
                Some(joined) = running.join_next(), if !running.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!("timer run panicked: {}", e);
                        }
                    }
                }
            }
        }
    });

    TimerHandle { task: handle }
}

/// Run `task` once, `delay` from now.
pub fn after<Fut>(delay: Duration, task: Fut) -> TimerHandle
where
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        time::sleep(delay).await;
        task.await;
    });

    TimerHandle { task: handle }
}
