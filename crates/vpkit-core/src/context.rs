#![forbid(unsafe_code)]

//! The per-session service container.
//!
//! A [`Context`] is created once per logical player session (one per
//! on-screen player) and is the ownership root for everything reactive: it
//! lazily constructs singleton services on first access, owns the
//! [`DependencyRegistry`] for non-service collaborators, and owns the
//! [`Scheduler`] that marshals timer callbacks back onto the session's
//! logical thread.
//!
//! # Invariants
//!
//! 1. `get`/`try_get` return the same instance for the same service type
//!    across repeated calls on the same context (`Rc::ptr_eq` identical).
//! 2. Construction is lazy: no eager graph resolution. Constructors may call
//!    `get` on other services — each nested call either returns an existing
//!    instance or begins constructing one.
//! 3. A true construction cycle (A constructs B constructs A) fails with
//!    [`ContextError::CyclicConstruction`] instead of recursing or returning
//!    a half-built instance.
//! 4. Services hold only [`ContextHandle`] weak back-references, so dropping
//!    the context is the single teardown path for every service it owns.
//!
//! # Failure Modes
//!
//! - `try_get` on a construction cycle returns `Err` at the call that closes
//!   the cycle; the partially pushed construction stack unwinds with the
//!   error.
//! - `get` panics on any `try_get` error; use it only where failure is a
//!   programming error (the same contract split as `RefCell::borrow` vs
//!   `try_borrow`).

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use web_time::Instant;

use crate::error::ContextError;
use crate::registry::{Dependency, DependencyRegistry};
use crate::service::Service;
use crate::time::Scheduler;

type ServiceMap = HashMap<TypeId, Rc<dyn Any>, ahash::RandomState>;

/// The per-session service locator and ownership root.
///
/// Constructed with [`Context::new`], which returns `Rc<Context>`; the owning
/// application holds the only strong reference and releases the whole
/// reactive graph by dropping it.
pub struct Context {
    weak: Weak<Context>,
    services: RefCell<ServiceMap>,
    constructing: RefCell<Vec<(TypeId, &'static str)>>,
    registry: DependencyRegistry,
    scheduler: Scheduler,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            weak: weak.clone(),
            services: RefCell::new(HashMap::default()),
            constructing: RefCell::new(Vec::new()),
            registry: DependencyRegistry::new(),
            scheduler: Scheduler::new(),
        })
    }

    /// A weak handle suitable for storing inside services and callbacks.
    #[must_use]
    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            weak: self.weak.clone(),
        }
    }

    fn strong(&self) -> Rc<Self> {
        self.weak
            .upgrade()
            .expect("Context method called during teardown")
    }

    // --- Service lookup ---

    /// Get the singleton instance of `S`, constructing it on first access.
    ///
    /// # Errors
    ///
    /// [`ContextError::CyclicConstruction`] when `S`'s construction
    /// transitively re-enters itself; any error a nested constructor
    /// propagates (e.g. an unregistered dependency).
    pub fn try_get<S: Service>(&self) -> Result<Rc<S>, ContextError> {
        let key = TypeId::of::<S>();

        let existing = self.services.borrow().get(&key).cloned();
        if let Some(service) = existing {
            let Ok(service) = service.downcast::<S>() else {
                unreachable!("service table entry matches its TypeId key")
            };
            return Ok(service);
        }

        if self.constructing.borrow().iter().any(|(id, _)| *id == key) {
            let mut names: Vec<&'static str> = self
                .constructing
                .borrow()
                .iter()
                .map(|(_, name)| *name)
                .collect();
            names.push(type_name::<S>());
            let cycle = names.join(" -> ");
            tracing::error!(%cycle, "service construction cycle");
            return Err(ContextError::CyclicConstruction { cycle });
        }

        tracing::debug!(service = type_name::<S>(), "constructing service");
        self.constructing.borrow_mut().push((key, type_name::<S>()));
        let built = S::create(&self.strong());
        self.constructing.borrow_mut().pop();

        let service = Rc::new(built?);
        self.services
            .borrow_mut()
            .insert(key, service.clone() as Rc<dyn Any>);
        Ok(service)
    }

    /// Get the singleton instance of `S`, constructing it on first access.
    ///
    /// # Panics
    ///
    /// Panics on any [`Self::try_get`] error. Use `try_get` where a cycle or
    /// missing dependency should be handled rather than abort setup.
    #[must_use]
    pub fn get<S: Service>(&self) -> Rc<S> {
        match self.try_get::<S>() {
            Ok(service) => service,
            Err(err) => panic!("Context::get::<{}> failed: {err}", type_name::<S>()),
        }
    }

    /// Whether an instance of `S` has already been constructed.
    #[must_use]
    pub fn contains<S: Service>(&self) -> bool {
        self.services.borrow().contains_key(&TypeId::of::<S>())
    }

    /// Number of services constructed so far.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.borrow().len()
    }

    // --- Dependency registry ---

    /// The registry for non-service collaborators.
    #[must_use]
    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// Resolve a dependency through the registry (memoized, lazy).
    ///
    /// # Errors
    ///
    /// [`ContextError::UnregisteredDependency`] when `D` has neither a
    /// fallback factory nor an installed override.
    pub fn resolve<D: Dependency>(&self) -> Result<Rc<D>, ContextError> {
        self.registry.resolve(&self.strong())
    }

    /// Install an override factory for `D`.
    ///
    /// Must run before the first `resolve::<D>` in this context; a later
    /// override is logged and ignored (the memoized instance is kept).
    pub fn set_override<D: Dependency>(&self, factory: impl Fn(&Rc<Context>) -> D + 'static) {
        self.registry.set_override(factory);
    }

    // --- Time ---

    /// The scheduler for one-shot timers.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.scheduler.now()
    }

    /// Fire all timers due up to `deadline` and advance virtual time to it.
    pub fn run_until(&self, deadline: Instant) {
        self.scheduler.run_until(deadline);
    }

    /// Advance virtual time by `duration`, firing due timers.
    pub fn advance(&self, duration: Duration) {
        self.scheduler.advance(duration);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("services", &self.services.borrow().len())
            .field("constructing", &self.constructing.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ContextHandle — weak back-reference
// ---------------------------------------------------------------------------

/// Non-owning handle to a [`Context`].
///
/// Services and timer/gesture callbacks store this instead of `Rc<Context>`
/// so the context remains the single owner of the graph. An upgrade failing
/// means the session is tearing down; callbacks treat that as "do nothing".
#[derive(Clone)]
pub struct ContextHandle {
    weak: Weak<Context>,
}

impl ContextHandle {
    /// Upgrade to a strong reference, or `None` during/after teardown.
    #[must_use]
    pub fn upgrade(&self) -> Option<Rc<Context>> {
        self.weak.upgrade()
    }

    /// Upgrade to a strong reference.
    ///
    /// # Panics
    ///
    /// Panics if the context has been dropped. Services may call this freely:
    /// the container owns its services, so a live service implies a live
    /// context.
    #[must_use]
    pub fn expect_context(&self) -> Rc<Context> {
        self.weak
            .upgrade()
            .expect("service outlived its Context; the container must own its services")
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("alive", &(self.weak.strong_count() > 0))
            .finish()
    }
}
