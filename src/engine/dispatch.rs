use std::{
    cmp::Ordering as CmpOrdering,
    collections::BinaryHeap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::rhythm::Beat;

/*
Deferred Notices
================

The scheduler queues a beat up to a horizon before it sounds, but listeners
want to hear about it when it sounds. Each notice is therefore parked in a
queue keyed by its absolute audio-clock time and delivered once that time
arrives:

  tick ──→ schedule(Beat @ 12.60 s) ──→ [heap: 12.60, 13.10, ...] ──→ on_beat
                                                  │
  stop() ─────────────────────────────────────────┘ cleared, live = false

Two delivery modes:

  Threaded  a worker sleeps until the earliest notice's deadline (its audio
            time translated to a wall-clock Instant when it was queued)
  Polled    the host's poll() delivers every notice whose audio time is at
            or before the current audio clock

Delivery re-checks the live flag under the listener lock, so once stop()
returns no listener runs until the next start().
*/

/// What listeners are told.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    Beat(Beat),
    /// The impact of cycle `n` was scheduled; the rest interval follows.
    CycleComplete(u64),
}

pub type BeatListener = Box<dyn FnMut(Beat) + Send>;
pub type CycleListener = Box<dyn FnMut(u64) + Send>;

/// The engine's callbacks.
#[derive(Default)]
pub struct Listeners {
    pub on_beat: Option<BeatListener>,
    pub on_cycle: Option<CycleListener>,
}

impl Listeners {
    fn deliver(&mut self, notice: Notice) {
        match notice {
            Notice::Beat(beat) => {
                if let Some(on_beat) = self.on_beat.as_mut() {
                    on_beat(beat);
                }
            }
            Notice::CycleComplete(cycle) => {
                if let Some(on_cycle) = self.on_cycle.as_mut() {
                    on_cycle(cycle);
                }
            }
        }
    }
}

struct Pending {
    fire_at: f64,
    seq: u64,
    deadline: Instant,
    notice: Notice,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed: BinaryHeap is a max-heap and the earliest notice goes first.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Queue {
    heap: BinaryHeap<Pending>,
    seq: u64,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    wake: Condvar,
    live: AtomicBool,
    listeners: Mutex<Listeners>,
}

impl Shared {
    fn lock_queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, notice: Notice) {
        let mut listeners = self.lock_listeners();
        if self.live.load(Ordering::Acquire) {
            listeners.deliver(notice);
        }
    }
}

/// Queues notices from the ticking side. Cheap to clone.
#[derive(Clone)]
pub struct DispatchHandle {
    shared: Arc<Shared>,
}

impl DispatchHandle {
    /// Deliver `notice` when the audio clock reaches `fire_at`. `audio_now`
    /// is the clock reading the notice was computed against and `read_at`
    /// the wall-clock instant it was taken.
    pub fn schedule(&self, notice: Notice, fire_at: f64, audio_now: f64, read_at: Instant) {
        if !self.shared.live.load(Ordering::Acquire) {
            return;
        }

        let delay = Duration::from_secs_f64((fire_at - audio_now).max(0.0));
        let mut queue = self.shared.lock_queue();
        let seq = queue.seq;
        queue.seq += 1;
        queue.heap.push(Pending {
            fire_at,
            seq,
            deadline: read_at + delay,
            notice,
        });
        drop(queue);
        self.shared.wake.notify_all();
    }
}

/// Delivers queued notices to the listeners at their time.
pub struct Dispatcher {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Deliver from a worker thread, or fall back to polled delivery when
    /// no thread can be started.
    pub fn threaded(listeners: Listeners) -> Self {
        let mut dispatcher = Self::polled(listeners);
        let shared = Arc::clone(&dispatcher.shared);

        match thread::Builder::new()
            .name("swing-dispatch".into())
            .spawn(move || run(shared))
        {
            Ok(handle) => dispatcher.worker = Some(handle),
            Err(err) => {
                warn!(error = %err, "dispatch thread unavailable, falling back to polled delivery")
            }
        }
        dispatcher
    }

    /// Deliver only from [`Dispatcher::poll`].
    pub fn polled(listeners: Listeners) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    heap: BinaryHeap::new(),
                    seq: 0,
                    shutdown: false,
                }),
                wake: Condvar::new(),
                live: AtomicBool::new(false),
                listeners: Mutex::new(listeners),
            }),
            worker: None,
        }
    }

    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_threaded(&self) -> bool {
        self.worker.is_some()
    }

    /// Accept and deliver notices.
    pub fn start(&self) {
        self.shared.live.store(true, Ordering::Release);
    }

    /// Drop every pending notice. Waits for a delivery in progress, so no
    /// listener runs after this returns.
    pub fn stop(&self) {
        self.shared.live.store(false, Ordering::Release);
        let dropped = {
            let mut queue = self.shared.lock_queue();
            let dropped = queue.heap.len();
            queue.heap.clear();
            dropped
        };
        self.shared.wake.notify_all();
        drop(self.shared.lock_listeners());
        debug!(dropped, "dispatcher stopped");
    }

    /// Polled mode: deliver every notice due at `audio_now`. Does nothing
    /// when a worker thread delivers.
    pub fn poll(&self, audio_now: f64) {
        if self.is_threaded() {
            return;
        }
        loop {
            let due = {
                let mut queue = self.shared.lock_queue();
                match queue.heap.peek() {
                    Some(next) if next.fire_at <= audio_now => queue.heap.pop(),
                    _ => None,
                }
            };
            match due {
                Some(pending) => self.shared.deliver(pending.notice),
                None => break,
            }
        }
    }

    /// Notices waiting for their time.
    pub fn pending(&self) -> usize {
        self.shared.lock_queue().heap.len()
    }
}

fn run(shared: Arc<Shared>) {
    let mut queue = shared.lock_queue();
    loop {
        if queue.shutdown {
            return;
        }

        let deadline = match queue.heap.peek() {
            Some(next) => next.deadline,
            None => {
                queue = shared
                    .wake
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }
        };

        let now = Instant::now();
        if deadline > now {
            queue = shared
                .wake
                .wait_timeout(queue, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }

        if let Some(pending) = queue.heap.pop() {
            drop(queue);
            shared.deliver(pending.notice);
            queue = shared.lock_queue();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shared.lock_queue().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
