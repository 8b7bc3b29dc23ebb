#![forbid(unsafe_code)]

//! The service contract and the shared base every service embeds.
//!
//! A service is a stateful, context-scoped singleton unit of behavior. Its
//! observable surface is a set of [`StateCell`]s plus one aggregated
//! "something changed" counter: the UI layer subscribes once per service
//! rather than once per field, and every cell declared through
//! [`ServiceCore::cell`] bumps the counter on write.
//!
//! # Writing a service
//!
//! ```ignore
//! struct VolumeService {
//!     core: ServiceCore,
//!     level: StateCell<f32>,
//! }
//!
//! impl Service for VolumeService {
//!     fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
//!         let core = ServiceCore::new(ctx);
//!         let level = core.cell(1.0);
//!         Ok(Self { core, level })
//!     }
//!
//!     fn core(&self) -> &ServiceCore {
//!         &self.core
//!     }
//! }
//!
//! impl VolumeService {
//!     fn set_level(&self, level: f32) {
//!         self.level.set(level.clamp(0.0, 1.0));
//!     }
//!
//!     fn level_cell(&self) -> CellReader<f32> {
//!         self.level.reader()
//!     }
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::context::{Context, ContextHandle};
use crate::error::ContextError;
use crate::reactive::{CellReader, StateCell, StateSync, Subscription};

/// A stateful, context-scoped singleton constructed lazily by the container.
///
/// Constructors receive the owning context and may call
/// [`Context::try_get`] on other services — that is how cross-service wiring
/// at construction time works. They must not assume any other service already
/// exists before they ask for it.
pub trait Service: 'static {
    /// Construct the service inside `ctx`.
    ///
    /// # Errors
    ///
    /// Propagate [`ContextError`] from nested lookups and dependency
    /// resolution; the container surfaces it at the outermost `try_get`.
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError>
    where
        Self: Sized;

    /// The embedded [`ServiceCore`].
    fn core(&self) -> &ServiceCore;
}

/// Shared base state embedded in every service.
///
/// Holds the weak context back-reference, the aggregated change counter, and
/// the forwarding subscriptions that connect declared cells to it.
pub struct ServiceCore {
    ctx: ContextHandle,
    changed: StateCell<u64>,
    held: RefCell<Vec<Subscription>>,
}

impl ServiceCore {
    /// Create the base for a service being constructed inside `ctx`.
    #[must_use]
    pub fn new(ctx: &Rc<Context>) -> Self {
        Self {
            ctx: ctx.handle(),
            changed: StateCell::new(0),
            held: RefCell::new(Vec::new()),
        }
    }

    /// Strong reference to the owning context.
    ///
    /// # Panics
    ///
    /// Panics if the context is gone — unreachable while the container's
    /// ownership invariant holds, since the context owns its services.
    #[must_use]
    pub fn context(&self) -> Rc<Context> {
        self.ctx.expect_context()
    }

    /// The weak context handle, for storing in timer/event callbacks.
    #[must_use]
    pub fn handle(&self) -> ContextHandle {
        self.ctx.clone()
    }

    /// Declare an observable cell with an initial value.
    ///
    /// Writes to the cell publish on the cell itself and bump this service's
    /// aggregated change counter.
    #[must_use]
    pub fn cell<T: Clone + 'static>(&self, initial: T) -> StateCell<T> {
        let cell = StateCell::new(initial);
        let changed = self.changed.clone();
        self.held
            .borrow_mut()
            .push(cell.subscribe(move |_| bump(&changed)));
        cell
    }

    /// Declare a lazily wired binding to another service's cell.
    ///
    /// The first `read()` installs a bridge that bumps this service's change
    /// counter on every future write of the target cell.
    #[must_use]
    pub fn sync<S, T>(&self, select: impl Fn(&S) -> CellReader<T> + 'static) -> StateSync<S, T>
    where
        S: Service,
        T: Clone + 'static,
    {
        StateSync::new(self.ctx.clone(), self.changed.clone(), select)
    }

    /// The aggregated change counter, for the UI layer's one-per-service
    /// subscription.
    #[must_use]
    pub fn changed(&self) -> CellReader<u64> {
        self.changed.reader()
    }

    /// Subscribe to this service's aggregated change notification.
    #[must_use]
    pub fn subscribe_changed(&self, callback: impl Fn() + 'static) -> Subscription {
        self.changed.subscribe(move |_| callback())
    }

    /// Bump the change counter without going through a cell.
    ///
    /// For events that have no value slot, e.g. a signal emission.
    pub fn mark_changed(&self) {
        bump(&self.changed);
    }

    /// Keep a subscription alive for this service's lifetime.
    pub fn hold(&self, subscription: Subscription) {
        self.held.borrow_mut().push(subscription);
    }
}

impl fmt::Debug for ServiceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCore")
            .field("changed", &self.changed.get())
            .field("held", &self.held.borrow().len())
            .finish()
    }
}

pub(crate) fn bump(counter: &StateCell<u64>) {
    counter.set(counter.get().wrapping_add(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Probe {
        core: ServiceCore,
        value: StateCell<i32>,
        label: StateCell<String>,
    }

    impl Service for Probe {
        fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
            let core = ServiceCore::new(ctx);
            let value = core.cell(0);
            let label = core.cell(String::new());
            Ok(Self { core, value, label })
        }

        fn core(&self) -> &ServiceCore {
            &self.core
        }
    }

    #[test]
    fn any_cell_write_bumps_aggregated_counter() {
        let ctx = Context::new();
        let probe = ctx.get::<Probe>();

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = probe.core().subscribe_changed(move || f.set(f.get() + 1));

        probe.value.set(1);
        probe.label.set("x".into());
        probe.value.set(2);
        assert_eq!(fires.get(), 3, "one notification per field write");
    }

    #[test]
    fn mark_changed_notifies_without_cell() {
        let ctx = Context::new();
        let probe = ctx.get::<Probe>();

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = probe.core().subscribe_changed(move || f.set(f.get() + 1));

        probe.core().mark_changed();
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn changed_reader_tracks_version() {
        let ctx = Context::new();
        let probe = ctx.get::<Probe>();
        let changed = probe.core().changed();

        let before = changed.get();
        probe.value.set(5);
        assert_eq!(changed.get(), before + 1);
    }

    #[test]
    fn context_accessor_returns_owner() {
        let ctx = Context::new();
        let probe = ctx.get::<Probe>();
        assert!(Rc::ptr_eq(&probe.core().context(), &ctx));
    }

    #[test]
    fn held_subscription_released_with_service() {
        let ctx = Context::new();
        let cell = StateCell::new(0);
        let fires = Rc::new(Cell::new(0u32));

        {
            let probe = ctx.get::<Probe>();
            let f = Rc::clone(&fires);
            probe.core().hold(cell.subscribe(move |_| f.set(f.get() + 1)));
        }
        cell.set(1);
        assert_eq!(fires.get(), 1, "service is still owned by the context");

        drop(ctx);
        cell.set(2);
        assert_eq!(fires.get(), 1, "teardown must release held subscriptions");
    }
}
