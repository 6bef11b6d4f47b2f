//! Keeps the live feed element and the people-count label in sync with the
//! detection backend.
//!
//! The feed element is bound once. After that a poll cycle runs every
//! `poll_interval` for as long as the monitor lives: fetch the count, write it
//! to the label. A failed cycle is logged and leaves the label alone, the next
//! tick simply tries again.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::{
    DashboardError,
    page::{MediaSink, TextSink},
    timer::{self, TimerHandle},
};

pub const FEED_URL: &str = "http://127.0.0.1:5000/video_feed";
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Anything that can report the current people count.
pub trait CountSource: Send + Sync + 'static {
    fn fetch_count(
        &self,
    ) -> impl Future<Output = Result<Number, DashboardError>> + Send;
}

/// What to do when a tick comes due while an earlier cycle is still waiting
/// on the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Start another cycle anyway. Whichever response resolves last wins the
    /// label.
    #[default]
    Race,
    /// Drop the tick.
    SkipWhileInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub feed_url: String,
    pub poll_interval: Duration,
    pub overlap: OverlapPolicy,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            feed_url: FEED_URL.to_string(),
            poll_interval: POLL_INTERVAL,
            overlap: OverlapPolicy::default(),
        }
    }
}

/// Snapshot of the poll counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl PollStats {
    /// Cycles that ran to completion, successfully or not.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Default)]
struct Counters {
    succeeded: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Clears the in-flight flag when a cycle ends, including when it is aborted.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct Inner<S, F, C> {
    source: S,
    feed: F,
    count: C,
    settings: MonitorSettings,
    feed_bound: AtomicBool,
    in_flight: AtomicBool,
    counters: Counters,
}

impl<S, F, C> Inner<S, F, C>
where
    S: CountSource,
    F: MediaSink,
    C: TextSink,
{
    fn bind_feed(&self) {
        if self.feed_bound.swap(true, Ordering::SeqCst) {
            return;
        }
        self.feed.set_source(&self.settings.feed_url);
    }

    async fn tick(&self) {
        match self.settings.overlap {
            OverlapPolicy::Race => self.poll_once().await,
            OverlapPolicy::SkipWhileInFlight => {
                if self.in_flight.swap(true, Ordering::SeqCst) {
                    self.counters.skipped.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!("previous count request still pending, skipping tick");
                    return;
                }
                let _guard = InFlight(&self.in_flight);
                self.poll_once().await;
            }
        }
    }

    async fn poll_once(&self) {
        match self.source.fetch_count().await {
            Ok(count) => {
                self.count.set_text(&render_count(&count));
                self.counters.succeeded.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!(error = %e, "Error fetching count");
            }
        }
    }
}

/// Text shown for a count. Whole numbers sent as floats (`4.0`) render
/// without the fraction, as a browser label would show them.
#[must_use]
pub fn render_count(count: &Number) -> String {
    match count.as_f64() {
        Some(value) if count.is_f64() => value.to_string(),
        _ => count.to_string(),
    }
}

pub struct LiveMonitor<S, F, C> {
    inner: Arc<Inner<S, F, C>>,
    timer: Option<TimerHandle>,
}

impl<S, F, C> LiveMonitor<S, F, C>
where
    S: CountSource,
    F: MediaSink,
    C: TextSink,
{
    pub fn new(source: S, feed: F, count: C, settings: MonitorSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                feed,
                count,
                settings,
                feed_bound: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                counters: Counters::default(),
            }),
            timer: None,
        }
    }

    /// Bind the feed URL to the feed element. Only the first call has any
    /// effect.
    pub fn initialize(&self) {
        self.inner.bind_feed();
    }

    /// Run a single poll cycle now. Failures are logged and counted, never
    /// returned.
    pub async fn poll_once(&self) {
        self.inner.poll_once().await;
    }

    /// Bind the feed (if not done yet) and start polling. Calling `start` on a
    /// running monitor does nothing.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }

        self.initialize();

        let inner = Arc::clone(&self.inner);
        self.timer = Some(timer::every(
            self.inner.settings.poll_interval,
            move || {
                let inner = Arc::clone(&inner);
                async move { inner.tick().await }
            },
        ));

        tracing::info!(
            interval = ?self.inner.settings.poll_interval,
            "live monitor started"
        );
    }

    /// Stop polling. Cycles still waiting on the backend are cancelled and
    /// will not write to the label.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
            tracing::info!("live monitor stopped");
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> PollStats {
        let counters = &self.inner.counters;
        PollStats {
            succeeded: counters.succeeded.load(Ordering::SeqCst),
            failed: counters.failed.load(Ordering::SeqCst),
            skipped: counters.skipped.load(Ordering::SeqCst),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &MonitorSettings {
        &self.inner.settings
    }
}

impl<S, F, C> Drop for LiveMonitor<S, F, C> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}
