#![forbid(unsafe_code)]

//! Lazily wired cross-service observer bindings.
//!
//! A [`StateSync`] lets one service observe another service's cell without
//! eagerly wiring the dependency at construction time — eager wiring would
//! make construction order matter across the whole graph. Instead, the first
//! `read()` resolves the target service through the context (constructing it
//! lazily if needed), installs a one-time bridge subscription, and from then
//! on every target write bumps the local service's aggregated change counter.
//!
//! # Invariants
//!
//! 1. Before the first `read()`, target writes cause no local notification.
//! 2. After the first `read()`, exactly one local notification per target
//!    write.
//! 3. The value is never cached: every `read()` re-fetches the live value.
//! 4. Wiring happens at most once per binding.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::context::ContextHandle;
use crate::reactive::{CellReader, StateCell, Subscription};
use crate::service::{Service, bump};

/// A lazily wired binding from the local service to a cell of service `S`.
///
/// Created through [`ServiceCore::sync`](crate::ServiceCore::sync).
pub struct StateSync<S: Service, T: Clone + 'static> {
    ctx: ContextHandle,
    changed: StateCell<u64>,
    select: Rc<dyn Fn(&S) -> CellReader<T>>,
    wired: Cell<bool>,
    bridge: RefCell<Option<Subscription>>,
}

impl<S: Service, T: Clone + 'static> StateSync<S, T> {
    pub(crate) fn new(
        ctx: ContextHandle,
        changed: StateCell<u64>,
        select: impl Fn(&S) -> CellReader<T> + 'static,
    ) -> Self {
        Self {
            ctx,
            changed,
            select: Rc::new(select),
            wired: Cell::new(false),
            bridge: RefCell::new(None),
        }
    }

    /// Read the live value of the target cell.
    ///
    /// On first access only, installs the bridge subscription that forwards
    /// future target writes into the local service's change counter. The
    /// target service is constructed here if it does not exist yet.
    ///
    /// # Panics
    ///
    /// Panics if resolving `S` fails (construction cycle or missing
    /// dependency) — at read time that is a wiring bug, not a recoverable
    /// condition.
    #[must_use]
    pub fn read(&self) -> T {
        let ctx = self.ctx.expect_context();
        let target = ctx.get::<S>();
        let cell = (self.select)(&target);

        if !self.wired.get() {
            self.wired.set(true);
            let changed = self.changed.clone();
            let bridge = cell.subscribe(move |_| bump(&changed));
            *self.bridge.borrow_mut() = Some(bridge);
            tracing::trace!(
                target_service = std::any::type_name::<S>(),
                "state sync wired"
            );
        }

        cell.get()
    }

    /// Whether the bridge subscription has been installed yet.
    #[must_use]
    pub fn is_wired(&self) -> bool {
        self.wired.get()
    }
}

impl<S: Service, T: Clone + 'static> fmt::Debug for StateSync<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSync")
            .field("target", &std::any::type_name::<S>())
            .field("wired", &self.wired.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::error::ContextError;
    use crate::service::ServiceCore;

    struct Source {
        core: ServiceCore,
        level: StateCell<u32>,
    }

    impl Service for Source {
        fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
            let core = ServiceCore::new(ctx);
            let level = core.cell(10);
            Ok(Self { core, level })
        }

        fn core(&self) -> &ServiceCore {
            &self.core
        }
    }

    impl Source {
        fn level_cell(&self) -> CellReader<u32> {
            self.level.reader()
        }
    }

    struct Mirror {
        core: ServiceCore,
        level: StateSync<Source, u32>,
    }

    impl Service for Mirror {
        fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
            let core = ServiceCore::new(ctx);
            let level = core.sync(Source::level_cell);
            Ok(Self { core, level })
        }

        fn core(&self) -> &ServiceCore {
            &self.core
        }
    }

    #[test]
    fn read_returns_live_value() {
        let ctx = Context::new();
        let mirror = ctx.get::<Mirror>();
        assert_eq!(mirror.level.read(), 10);

        ctx.get::<Source>().level.set(20);
        assert_eq!(mirror.level.read(), 20);
    }

    #[test]
    fn read_constructs_target_lazily() {
        let ctx = Context::new();
        let mirror = ctx.get::<Mirror>();
        assert!(!ctx.contains::<Source>(), "binding declaration must not construct the target");

        let _ = mirror.level.read();
        assert!(ctx.contains::<Source>());
    }

    #[test]
    fn no_notification_before_first_read() {
        let ctx = Context::new();
        let mirror = ctx.get::<Mirror>();

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = mirror.core().subscribe_changed(move || f.set(f.get() + 1));

        ctx.get::<Source>().level.set(99);
        assert_eq!(fires.get(), 0, "unwired binding must stay silent");
        assert!(!mirror.level.is_wired());
    }

    #[test]
    fn exactly_one_notification_per_target_write_after_first_read() {
        let ctx = Context::new();
        let mirror = ctx.get::<Mirror>();
        let _ = mirror.level.read();
        assert!(mirror.level.is_wired());

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = mirror.core().subscribe_changed(move || f.set(f.get() + 1));

        let source = ctx.get::<Source>();
        source.level.set(1);
        source.level.set(2);
        source.level.set(3);
        assert_eq!(fires.get(), 3);
    }

    #[test]
    fn repeated_reads_wire_only_once() {
        let ctx = Context::new();
        let mirror = ctx.get::<Mirror>();
        let _ = mirror.level.read();
        let _ = mirror.level.read();
        let _ = mirror.level.read();

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = mirror.core().subscribe_changed(move || f.set(f.get() + 1));

        ctx.get::<Source>().level.set(42);
        assert_eq!(fires.get(), 1, "one bridge, not one per read");
    }
}
