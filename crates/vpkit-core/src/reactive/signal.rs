#![forbid(unsafe_code)]

//! Value-less publish/subscribe channel for discrete events.
//!
//! [`Signal<T>`] carries events that have no "current value" — gestures,
//! commands, one-shot notifications. It shares the delivery semantics of
//! [`StateCell`](super::StateCell): synchronous ordered delivery over a
//! subscriber snapshot, with re-entrant emits queued behind the in-progress
//! pass.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use super::cell::Subscription;

type Callback<T> = Rc<dyn Fn(&T)>;

struct SubscriberEntry<T> {
    id: u64,
    callback: Callback<T>,
}

struct SignalInner<T> {
    subscribers: RefCell<Vec<SubscriberEntry<T>>>,
    next_sub_id: Cell<u64>,
    notify_depth: Cell<u32>,
    queued: RefCell<VecDeque<T>>,
}

/// A shared event channel without a stored value.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    /// Create an empty signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                subscribers: RefCell::new(Vec::new()),
                next_sub_id: Cell::new(1),
                notify_depth: Cell::new(0),
                queued: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Emit an event to every subscriber, synchronously, in subscription
    /// order. Re-entrant emits are queued behind the in-progress pass.
    pub fn emit(&self, event: T) {
        if self.inner.notify_depth.get() > 0 {
            self.inner.queued.borrow_mut().push_back(event);
            return;
        }

        self.inner.notify_depth.set(1);
        self.deliver(&event);
        loop {
            let next = self.inner.queued.borrow_mut().pop_front();
            match next {
                Some(e) => self.deliver(&e),
                None => break,
            }
        }
        self.inner.notify_depth.set(0);
    }

    fn deliver(&self, event: &T) {
        let snapshot: Vec<Callback<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_sub_id.get();
        self.inner.next_sub_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(SubscriberEntry {
            id,
            callback: Rc::new(callback),
        });

        let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}
