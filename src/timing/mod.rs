//! Timing Source: a periodic "time to check the schedule" wake-up.
//!
//! A tick carries no musical information. The scheduler decides what is due
//! by comparing its next beat time against the audio clock, so tick jitter
//! only shifts when a beat is *queued*, never when it *sounds*.
//!
//! Two interchangeable implementations:
//!
//! - [`ThreadTicker`]: a dedicated worker thread, immune to load on the
//!   owning thread.
//! - [`PolledTicker`]: same-thread fallback, driven by the host's own loop.
//!
//! [`TickSource`] picks the threaded one when it can and silently falls back
//! otherwise.

use std::time::{Duration, Instant};

use tracing::warn;

pub mod polled;
pub mod thread;

pub use polled::PolledTicker;
pub use thread::ThreadTicker;

/// Default tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(25);

/// Contract shared by every ticker.
pub trait TimingSource {
    /// Set the tick period. An active ticker restarts with the new period.
    fn configure(&mut self, period: Duration);

    /// Begin ticking. Idempotent.
    fn start(&mut self);

    /// Stop ticking. Idempotent; no tick is delivered after it returns.
    fn stop(&mut self);

    fn is_active(&self) -> bool;

    fn period(&self) -> Duration;
}

/// The ticker an engine actually runs on.
pub enum TickSource {
    Threaded(ThreadTicker),
    Polled(PolledTicker),
}

impl TickSource {
    /// A threaded ticker calling `on_tick`, or a polled one if no thread can
    /// be started.
    pub fn threaded_or_polled<F>(period: Duration, on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        match ThreadTicker::spawn(period, on_tick) {
            Ok(ticker) => TickSource::Threaded(ticker),
            Err(err) => {
                warn!(error = %err, "timing thread unavailable, falling back to polled ticks");
                TickSource::polled(period)
            }
        }
    }

    pub fn polled(period: Duration) -> Self {
        TickSource::Polled(PolledTicker::new(period))
    }

    pub fn is_threaded(&self) -> bool {
        matches!(self, TickSource::Threaded(_))
    }

    /// For the polled variant, whether a tick is due at `now`. The threaded
    /// variant delivers its own ticks and always returns `false`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self {
            TickSource::Threaded(_) => false,
            TickSource::Polled(ticker) => ticker.poll(now),
        }
    }

    fn source(&self) -> &dyn TimingSource {
        match self {
            TickSource::Threaded(ticker) => ticker,
            TickSource::Polled(ticker) => ticker,
        }
    }

    fn source_mut(&mut self) -> &mut dyn TimingSource {
        match self {
            TickSource::Threaded(ticker) => ticker,
            TickSource::Polled(ticker) => ticker,
        }
    }
}

impl TimingSource for TickSource {
    fn configure(&mut self, period: Duration) {
        self.source_mut().configure(period);
    }

    fn start(&mut self) {
        self.source_mut().start();
    }

    fn stop(&mut self) {
        self.source_mut().stop();
    }

    fn is_active(&self) -> bool {
        self.source().is_active()
    }

    fn period(&self) -> Duration {
        self.source().period()
    }
}
