#![forbid(unsafe_code)]

//! Observable value slot with publish-on-write semantics.
//!
//! [`StateCell<T>`] is the leaf primitive of the reactive graph: a cloneable
//! handle to a shared slot holding the last published value, a monotonically
//! increasing version, and an ordered subscriber list. Writes publish
//! synchronously before returning; re-entrant writes are queued.
//!
//! # Re-entrancy
//!
//! A subscriber callback may write to the cell it is being notified about.
//! The nested write updates the stored value immediately but its notification
//! pass is queued and runs after the current pass completes, so notification
//! depth is bounded regardless of how subscribers chain writes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct SubscriberEntry<T> {
    id: u64,
    callback: Callback<T>,
}

struct CellInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    subscribers: RefCell<Vec<SubscriberEntry<T>>>,
    next_sub_id: Cell<u64>,
    notify_depth: Cell<u32>,
    queued: RefCell<VecDeque<T>>,
}

/// A shared observable value slot.
///
/// Cloning a `StateCell` clones the handle, not the value: all clones read
/// and write the same slot. Services create cells through
/// [`ServiceCore::cell`](crate::ServiceCore::cell) so that every write also
/// bumps the service-level change counter.
pub struct StateCell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> StateCell<T> {
    /// Create a cell holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                value: RefCell::new(initial),
                version: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                next_sub_id: Cell::new(1),
                notify_depth: Cell::new(0),
                queued: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Get a clone of the last published value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Number of writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Write a new value and publish it to every subscriber.
    ///
    /// Publishing happens synchronously: when `set` returns, every subscriber
    /// registered before the call has observed `value` (or a strictly newer
    /// value queued during notification). If called from inside a subscriber
    /// callback, the value is stored immediately and its notification pass is
    /// queued behind the in-progress one.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.version.set(self.inner.version.get() + 1);

        if self.inner.notify_depth.get() > 0 {
            self.inner.queued.borrow_mut().push_back(value);
            return;
        }

        self.inner.notify_depth.set(1);
        self.deliver(&value);
        loop {
            let next = self.inner.queued.borrow_mut().pop_front();
            match next {
                Some(v) => self.deliver(&v),
                None => break,
            }
        }
        self.inner.notify_depth.set(0);
    }

    fn deliver(&self, value: &T) {
        // Snapshot so subscribe/unsubscribe during the pass cannot affect it.
        let snapshot: Vec<Callback<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    /// Subscribe to future writes. The callback does not fire for the value
    /// already stored at subscribe time.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_sub_id.get();
        self.inner.next_sub_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(SubscriberEntry {
            id,
            callback: Rc::new(callback),
        });

        let weak: Weak<CellInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }

    /// A read/subscribe-only view of this cell.
    #[must_use]
    pub fn reader(&self) -> CellReader<T> {
        CellReader { cell: self.clone() }
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Subscription — RAII unsubscribe guard
// ---------------------------------------------------------------------------

/// RAII guard for an active subscription.
///
/// Dropping the guard removes the callback. The guard is type-erased so a
/// service can hold subscriptions to cells of different types in one vec.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribe now instead of at drop time.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Leave the callback subscribed for the lifetime of its cell.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CellReader — read/subscribe-only view
// ---------------------------------------------------------------------------

/// Read/subscribe-only view of a [`StateCell`].
///
/// Services expose their cells as readers so outside code observes state but
/// mutates it only through the owning service's public operations.
pub struct CellReader<T> {
    cell: StateCell<T>,
}

impl<T> Clone for CellReader<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: Clone + 'static> CellReader<T> {
    /// Get a clone of the last published value.
    #[must_use]
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Borrow the value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }

    /// Number of writes since the cell was created.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    /// Subscribe to future writes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for CellReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellReader")
            .field("value", &self.cell.get())
            .finish()
    }
}
