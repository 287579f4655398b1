use std::time::{Duration, Instant};

use crate::timing::TimingSource;

/// Same-thread ticker: the host calls `poll()` from its own loop and gets
/// `true` whenever a tick is due.
///
/// Same fixed-rate semantics as the threaded ticker. A zero period makes
/// every poll a tick.
#[derive(Debug, Clone)]
pub struct PolledTicker {
    period: Duration,
    active: bool,
    next_due: Option<Instant>,
}

impl PolledTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            active: false,
            next_due: None,
        }
    }

    /// Whether a tick is due at `now`. Advances the deadline when it is.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }

        let due = *self.next_due.get_or_insert(now);
        if now < due {
            return false;
        }

        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        true
    }
}

impl TimingSource for PolledTicker {
    fn configure(&mut self, period: Duration) {
        self.period = period;
        if self.active {
            self.next_due = Some(Instant::now() + period);
        }
    }

    fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.next_due = Some(Instant::now() + self.period);
        }
    }

    fn stop(&mut self) {
        self.active = false;
        self.next_due = None;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(25);

    #[test]
    fn inactive_never_ticks() {
        let mut ticker = PolledTicker::new(PERIOD);
        assert!(!ticker.poll(Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn ticks_once_per_period() {
        let mut ticker = PolledTicker::new(PERIOD);
        ticker.start();
        let t0 = Instant::now();

        assert!(!ticker.poll(t0));
        assert!(ticker.poll(t0 + PERIOD));
        assert!(!ticker.poll(t0 + PERIOD + Duration::from_millis(10)));
        assert!(ticker.poll(t0 + PERIOD * 2));
    }

    #[test]
    fn late_poll_fires_once_without_burst() {
        let mut ticker = PolledTicker::new(PERIOD);
        ticker.start();
        let late = Instant::now() + PERIOD * 10;

        assert!(ticker.poll(late));
        assert!(!ticker.poll(late));
        assert!(ticker.poll(late + PERIOD));
    }

    #[test]
    fn zero_period_ticks_on_every_poll() {
        let mut ticker = PolledTicker::new(Duration::ZERO);
        ticker.start();
        let now = Instant::now();

        assert!(ticker.poll(now));
        assert!(ticker.poll(now));
        assert!(ticker.poll(now + Duration::from_millis(1)));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut ticker = PolledTicker::new(Duration::ZERO);
        ticker.start();
        ticker.stop();
        ticker.stop();

        assert!(!ticker.is_active());
        assert!(!ticker.poll(Instant::now()));
    }
}
