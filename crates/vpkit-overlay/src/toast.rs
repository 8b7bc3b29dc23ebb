#![forbid(unsafe_code)]

//! Transient toast notices with per-entry expiry.
//!
//! Toasts queue FIFO in one observable `Vec`; each entry owns its own
//! removal timer, so entries expire independently of arrival order — an
//! early `dismiss` of the first toast never shifts the second one's
//! deadline.
//!
//! The queue is unbounded; call sites are expected to self-limit, and a
//! `tracing::warn!` fires when the depth crosses [`QUEUE_WARN_DEPTH`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use vpkit_core::{CellReader, Context, ContextError, Service, ServiceCore, StateCell, TimerHandle};

/// Default time a toast stays on screen.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

/// Queue depth past which a warning is logged.
pub const QUEUE_WARN_DEPTH: usize = 32;

static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique toast identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    fn next() -> Self {
        Self(NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One queued toast.
#[derive(Clone)]
pub struct Toast {
    pub id: ToastId,
    pub content: Rc<dyn Any>,
}

/// The toast queue state machine.
pub struct ToastService {
    core: ServiceCore,
    items: StateCell<Vec<Toast>>,
    duration: Cell<Duration>,
    timers: RefCell<HashMap<ToastId, TimerHandle, ahash::RandomState>>,
}

impl Service for ToastService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let items = core.cell(Vec::new());
        Ok(Self {
            core,
            items,
            duration: Cell::new(DEFAULT_DURATION),
            timers: RefCell::new(HashMap::default()),
        })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl ToastService {
    #[must_use]
    pub fn items_cell(&self) -> CellReader<Vec<Toast>> {
        self.items.reader()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.with(Vec::len)
    }

    /// Set the on-screen duration for toasts enqueued after this call.
    pub fn set_duration(&self, duration: Duration) {
        self.duration.set(duration);
    }

    /// Enqueue a toast; it is removed automatically after the configured
    /// duration.
    pub fn toast(&self, content: Rc<dyn Any>) -> ToastId {
        let id = ToastId::next();

        let depth = self.items.with(Vec::len) + 1;
        if depth > QUEUE_WARN_DEPTH {
            tracing::warn!(depth, "toast queue depth past watermark");
        }

        let mut items = self.items.get();
        items.push(Toast { id, content });
        self.items.set(items);

        let handle = self.core.handle();
        let timer = self
            .core
            .context()
            .scheduler()
            .schedule_after(self.duration.get(), move || {
                if let Some(ctx) = handle.upgrade() {
                    ctx.get::<ToastService>().remove(id);
                }
            });
        self.timers.borrow_mut().insert(id, timer);
        id
    }

    /// Remove a toast before its timer fires. No-op for unknown ids.
    pub fn dismiss(&self, id: ToastId) {
        self.remove(id);
    }

    fn remove(&self, id: ToastId) {
        self.timers.borrow_mut().remove(&id);
        let mut items = self.items.get();
        let before = items.len();
        items.retain(|toast| toast.id != id);
        if items.len() != before {
            self.items.set(items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn shown(service: &ToastService) -> Vec<ToastId> {
        service.items.with(|items| items.iter().map(|t| t.id).collect())
    }

    #[test]
    fn toast_appears_then_expires() {
        let ctx = Context::new();
        let toasts = ctx.get::<ToastService>();

        let id = toasts.toast(Rc::new("saved"));
        assert_eq!(shown(&toasts), vec![id]);

        ctx.advance(DEFAULT_DURATION);
        assert_eq!(toasts.count(), 0);
    }

    #[test]
    fn entries_expire_independently_of_arrival_order() {
        let ctx = Context::new();
        let toasts = ctx.get::<ToastService>();

        let a = toasts.toast(Rc::new("a"));
        ctx.advance(1000 * MS);
        let b = toasts.toast(Rc::new("b"));
        assert_eq!(shown(&toasts), vec![a, b]);

        // a expires at 3.0s, b at 4.0s.
        ctx.advance(2500 * MS);
        assert_eq!(shown(&toasts), vec![b]);
        ctx.advance(1000 * MS);
        assert_eq!(toasts.count(), 0);
    }

    #[test]
    fn early_dismiss_cancels_the_timer() {
        let ctx = Context::new();
        let toasts = ctx.get::<ToastService>();

        let a = toasts.toast(Rc::new("a"));
        let b = toasts.toast(Rc::new("b"));
        toasts.dismiss(a);
        assert_eq!(shown(&toasts), vec![b]);

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = toasts.items_cell().subscribe(move |_| f.set(f.get() + 1));

        ctx.advance(DEFAULT_DURATION);
        assert_eq!(fires.get(), 1, "only b's expiry publishes");
        assert_eq!(toasts.count(), 0);
    }

    #[test]
    fn dismiss_unknown_id_is_noop() {
        let ctx = Context::new();
        let toasts = ctx.get::<ToastService>();
        let id = toasts.toast(Rc::new("a"));
        toasts.dismiss(id);

        let fires = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fires);
        let _sub = toasts.items_cell().subscribe(move |_| f.set(f.get() + 1));

        toasts.dismiss(id);
        assert_eq!(fires.get(), 0);
    }

    #[test]
    fn set_duration_applies_to_new_toasts() {
        let ctx = Context::new();
        let toasts = ctx.get::<ToastService>();
        toasts.set_duration(500 * MS);

        let _ = toasts.toast(Rc::new("quick"));
        ctx.advance(500 * MS);
        assert_eq!(toasts.count(), 0);
    }

    #[test]
    fn ids_are_unique_across_services() {
        let ctx1 = Context::new();
        let ctx2 = Context::new();
        let a = ctx1.get::<ToastService>().toast(Rc::new(1u8));
        let b = ctx2.get::<ToastService>().toast(Rc::new(2u8));
        assert_ne!(a, b);
    }
}
