#![forbid(unsafe_code)]

//! Host-pumped one-shot timers on a virtual clock.
//!
//! The [`Scheduler`] owns no thread. The embedding host advances time
//! explicitly — once per frame, from a platform timer, or step by step in
//! tests — and due callbacks run synchronously inside that call, on the same
//! logical thread as every cell write. That keeps the whole reactive graph
//! single-threaded: a timer firing is just another synchronous mutation.
//!
//! Timers are cancel-on-drop. Auto-hide debouncing falls out of that for
//! free: overwrite the stored [`TimerHandle`] with a fresh one and the old
//! timer dies.
//!
//! # Invariants
//!
//! 1. Due timers fire in `(deadline, schedule order)` order.
//! 2. A timer never fires before its deadline.
//! 3. `now()` equals the fired timer's deadline while its callback runs.
//! 4. Dropping a [`TimerHandle`] cancels the timer if it has not fired.
//! 5. A callback may schedule new timers; ones due within the current
//!    `run_until` window fire in the same call.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use web_time::Instant;

type TimerFn = Box<dyn FnOnce()>;

struct TimerEntry {
    id: u64,
    deadline: Instant,
    callback: TimerFn,
}

struct SchedulerInner {
    now: Cell<Instant>,
    timers: RefCell<Vec<TimerEntry>>,
    next_id: Cell<u64>,
}

/// Virtual-time one-shot timer queue, pumped by the host.
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                now: Cell::new(Instant::now()),
                timers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.inner.now.get()
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Schedule `callback` to run at the absolute virtual time `deadline`.
    ///
    /// The returned handle cancels the timer when dropped; hold it for as
    /// long as the callback should stay armed.
    #[must_use]
    pub fn schedule_at(&self, deadline: Instant, callback: impl FnOnce() + 'static) -> TimerHandle {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.timers.borrow_mut().push(TimerEntry {
            id,
            deadline,
            callback: Box::new(callback),
        });
        tracing::trace!(timer = id, "timer scheduled");
        TimerHandle {
            scheduler: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Schedule `callback` to run `delay` after the current virtual time.
    #[must_use]
    pub fn schedule_after(
        &self,
        delay: Duration,
        callback: impl FnOnce() + 'static,
    ) -> TimerHandle {
        self.schedule_at(self.inner.now.get() + delay, callback)
    }

    /// Advance virtual time to `deadline`, firing every due timer.
    ///
    /// Timers fire in `(deadline, schedule order)` order with `now()` set to
    /// their deadline. Callbacks run with no internal borrow held, so they
    /// may freely schedule, cancel, or drop handles; newly scheduled timers
    /// due within the window fire in this same call.
    pub fn run_until(&self, deadline: Instant) {
        loop {
            let due = {
                let timers = self.inner.timers.borrow();
                timers
                    .iter()
                    .filter(|entry| entry.deadline <= deadline)
                    .map(|entry| (entry.deadline, entry.id))
                    .min()
            };
            let Some((fire_at, id)) = due else { break };

            let entry = {
                let mut timers = self.inner.timers.borrow_mut();
                let Some(pos) = timers.iter().position(|entry| entry.id == id) else {
                    unreachable!("due timer vanished between scan and removal")
                };
                timers.swap_remove(pos)
            };

            if fire_at > self.inner.now.get() {
                self.inner.now.set(fire_at);
            }
            tracing::trace!(timer = id, "timer fired");
            (entry.callback)();
        }

        if deadline > self.inner.now.get() {
            self.inner.now.set(deadline);
        }
    }

    /// Advance virtual time by `duration`, firing every due timer.
    pub fn advance(&self, duration: Duration) {
        self.run_until(self.inner.now.get() + duration);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.inner.timers.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TimerHandle — cancel-on-drop
// ---------------------------------------------------------------------------

/// Owning handle to a scheduled timer.
///
/// Dropping the handle cancels the timer if it has not fired yet. Replacing
/// a stored handle with a freshly scheduled one is therefore a debounce.
#[must_use = "dropping a TimerHandle cancels its timer"]
pub struct TimerHandle {
    scheduler: Weak<SchedulerInner>,
    id: u64,
}

impl TimerHandle {
    /// Whether the timer is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.scheduler
            .upgrade()
            .is_some_and(|inner| inner.timers.borrow().iter().any(|entry| entry.id == self.id))
    }

    /// Cancel the timer explicitly. Equivalent to dropping the handle.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.scheduler.upgrade() {
            inner
                .timers
                .borrow_mut()
                .retain(|entry| entry.id != self.id);
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("pending", &self.is_pending())
            .finish()
    }
}
