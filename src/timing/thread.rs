use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    error::{EngineError, Result},
    timing::TimingSource,
};

/// Shortest period the worker thread will sleep for.
pub const MIN_THREAD_PERIOD: Duration = Duration::from_millis(1);

struct Control {
    active: bool,
    shutdown: bool,
    period: Duration,
    /// Bumped on every (re)start so the worker drops its old deadline.
    generation: u64,
}

struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ticker on its own thread, so tick spacing does not depend on how busy
/// the thread that owns the engine is.
///
/// Ticks are fixed-rate: each deadline is the previous one plus the period.
/// A worker that oversleeps fires once and re-anchors instead of bursting.
///
/// The callback runs with the control lock held, so once `stop()` returns
/// no further tick is delivered.
pub struct ThreadTicker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadTicker {
    /// Spawn the worker. It idles until `start()`.
    pub fn spawn<F>(period: Duration, on_tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            control: Mutex::new(Control {
                active: false,
                shutdown: false,
                period,
                generation: 0,
            }),
            wake: Condvar::new(),
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("swing-ticker".into())
            .spawn(move || run(worker, on_tick))
            .map_err(|source| EngineError::Spawn {
                name: "ticker",
                source,
            })?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }
}

fn run<F: FnMut()>(shared: Arc<Shared>, mut on_tick: F) {
    let mut control = shared.lock();
    let mut generation = control.generation;
    let mut deadline: Option<Instant> = None;

    loop {
        if control.shutdown {
            return;
        }

        if !control.active {
            deadline = None;
            control = shared
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        }

        if control.generation != generation {
            generation = control.generation;
            deadline = None;
        }

        let period = control.period.max(MIN_THREAD_PERIOD);
        let due = *deadline.get_or_insert_with(|| Instant::now() + period);
        let now = Instant::now();
        if now < due {
            control = shared
                .wake
                .wait_timeout(control, due - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }

        on_tick();

        let next = due + period;
        deadline = Some(if next <= now { now + period } else { next });
    }
}

impl TimingSource for ThreadTicker {
    fn configure(&mut self, period: Duration) {
        let mut control = self.shared.lock();
        control.period = period;
        if control.active {
            control.generation += 1;
        }
        drop(control);
        self.shared.wake.notify_all();
    }

    fn start(&mut self) {
        let mut control = self.shared.lock();
        if control.active {
            return;
        }
        control.active = true;
        control.generation += 1;
        debug!(period = ?control.period, "ticker thread started");
        drop(control);
        self.shared.wake.notify_all();
    }

    fn stop(&mut self) {
        let mut control = self.shared.lock();
        if control.active {
            control.active = false;
            debug!("ticker thread stopped");
        }
        drop(control);
        self.shared.wake.notify_all();
    }

    fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    fn period(&self) -> Duration {
        self.shared.lock().period
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
