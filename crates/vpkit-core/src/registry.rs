#![forbid(unsafe_code)]

//! Keyed, override-able factory cache for non-service collaborators.
//!
//! Services look each other up through the container; everything else a
//! service needs injected (a media backend, a network client, an environment
//! value) goes through the [`DependencyRegistry`]. Each dependency type
//! resolves at most once per context and the result is memoized, so every
//! service that asks gets the same instance.
//!
//! Production code ships a default by implementing [`Dependency::fallback`];
//! test code swaps the implementation by installing an override *before the
//! first resolve*:
//!
//! ```ignore
//! ctx.set_override::<MediaHandle>(|_| MediaHandle(Rc::new(RecordingBackend::default())));
//! let playback = ctx.get::<PlaybackService>();
//! ```
//!
//! # Invariants
//!
//! 1. A dependency's factory runs at most once per context.
//! 2. An override installed before first resolution replaces the fallback.
//! 3. An override installed after first resolution is logged and ignored —
//!    the memoized instance is kept. Retroactive replacement would hand two
//!    generations of the same collaborator to different services
//!    mid-session.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::error::ContextError;

/// A value injectable through the [`DependencyRegistry`].
///
/// The implementing type is its own key. `fallback` is the production
/// default factory; returning `None` (the default) makes the dependency
/// mandatory-to-override, which fails `resolve` loudly when the embedding
/// forgot to supply it.
pub trait Dependency: 'static {
    /// Produce the production default, or `None` if the embedding must
    /// always register the value explicitly.
    fn fallback(ctx: &Rc<Context>) -> Option<Self>
    where
        Self: Sized,
    {
        let _ = ctx;
        None
    }
}

type FactoryFn = dyn Fn(&Rc<Context>) -> Rc<dyn Any>;
type TypedMap<V> = HashMap<TypeId, V, ahash::RandomState>;

/// Per-context table of dependency overrides and memoized resolutions.
pub struct DependencyRegistry {
    overrides: RefCell<TypedMap<Rc<FactoryFn>>>,
    resolved: RefCell<TypedMap<Rc<dyn Any>>>,
}

impl DependencyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            overrides: RefCell::new(HashMap::default()),
            resolved: RefCell::new(HashMap::default()),
        }
    }

    /// Install an override factory for `D`.
    ///
    /// Effective only if `D` has not been resolved yet in this context; a
    /// late override is logged via `tracing::warn!` and otherwise ignored.
    pub fn set_override<D: Dependency>(&self, factory: impl Fn(&Rc<Context>) -> D + 'static) {
        let key = TypeId::of::<D>();
        if self.resolved.borrow().contains_key(&key) {
            tracing::warn!(
                dependency = type_name::<D>(),
                "override installed after first resolve; memoized instance kept"
            );
        }
        let boxed: Rc<FactoryFn> = Rc::new(move |ctx| Rc::new(factory(ctx)) as Rc<dyn Any>);
        self.overrides.borrow_mut().insert(key, boxed);
    }

    /// Whether `D` has already been resolved in this context.
    #[must_use]
    pub fn is_resolved<D: Dependency>(&self) -> bool {
        self.resolved.borrow().contains_key(&TypeId::of::<D>())
    }

    /// Resolve `D`, running its factory on first call and memoizing.
    ///
    /// # Errors
    ///
    /// [`ContextError::UnregisteredDependency`] when `D` has neither a
    /// fallback nor an override.
    pub fn resolve<D: Dependency>(&self, ctx: &Rc<Context>) -> Result<Rc<D>, ContextError> {
        let key = TypeId::of::<D>();

        let cached = self.resolved.borrow().get(&key).cloned();
        if let Some(value) = cached {
            let Ok(value) = value.downcast::<D>() else {
                unreachable!("resolved table entry matches its TypeId key")
            };
            return Ok(value);
        }

        let factory = self.overrides.borrow().get(&key).cloned();
        let value: Rc<dyn Any> = match factory {
            Some(factory) => factory(ctx),
            None => match D::fallback(ctx) {
                Some(value) => Rc::new(value),
                None => {
                    return Err(ContextError::UnregisteredDependency {
                        name: type_name::<D>(),
                    });
                }
            },
        };

        tracing::debug!(dependency = type_name::<D>(), "dependency resolved");
        self.resolved.borrow_mut().insert(key, value.clone());
        let Ok(value) = value.downcast::<D>() else {
            unreachable!("factory output matches its TypeId key")
        };
        Ok(value)
    }
}

impl fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRegistry")
            .field("overrides", &self.overrides.borrow().len())
            .field("resolved", &self.resolved.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct ApiEndpoint(String);

    impl Dependency for ApiEndpoint {
        fn fallback(_ctx: &Rc<Context>) -> Option<Self> {
            Some(Self("https://api.example.com".into()))
        }
    }

    #[derive(Debug, PartialEq)]
    struct Mandatory(u32);

    impl Dependency for Mandatory {}

    #[test]
    fn fallback_used_when_no_override() {
        let ctx = Context::new();
        let endpoint = ctx.resolve::<ApiEndpoint>().expect("fallback exists");
        assert_eq!(endpoint.0, "https://api.example.com");
    }

    #[test]
    fn resolution_is_memoized() {
        let ctx = Context::new();
        let a = ctx.resolve::<ApiEndpoint>().expect("fallback exists");
        let b = ctx.resolve::<ApiEndpoint>().expect("fallback exists");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn factory_runs_at_most_once() {
        let ctx = Context::new();
        let runs = Rc::new(std::cell::Cell::new(0u32));
        let r = Rc::clone(&runs);
        ctx.set_override::<Mandatory>(move |_| {
            r.set(r.get() + 1);
            Mandatory(1)
        });

        let _ = ctx.resolve::<Mandatory>().expect("override installed");
        let _ = ctx.resolve::<Mandatory>().expect("override installed");
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn override_before_resolve_replaces_fallback() {
        let ctx = Context::new();
        ctx.set_override::<ApiEndpoint>(|_| ApiEndpoint("http://localhost:9999".into()));
        let endpoint = ctx.resolve::<ApiEndpoint>().expect("override installed");
        assert_eq!(endpoint.0, "http://localhost:9999");
    }

    #[test]
    fn override_after_resolve_keeps_memoized() {
        let ctx = Context::new();
        let first = ctx.resolve::<ApiEndpoint>().expect("fallback exists");
        assert_eq!(first.0, "https://api.example.com");

        ctx.set_override::<ApiEndpoint>(|_| ApiEndpoint("http://too-late".into()));
        let second = ctx.resolve::<ApiEndpoint>().expect("already memoized");
        assert!(Rc::ptr_eq(&first, &second), "late override must not replace");
    }

    #[test]
    fn missing_dependency_fails_loudly() {
        let ctx = Context::new();
        let err = ctx.resolve::<Mandatory>().expect_err("no fallback, no override");
        assert!(matches!(err, ContextError::UnregisteredDependency { .. }));
        assert!(err.to_string().contains("Mandatory"));
    }

    #[test]
    fn is_resolved_tracks_state() {
        let ctx = Context::new();
        assert!(!ctx.registry().is_resolved::<ApiEndpoint>());
        let _ = ctx.resolve::<ApiEndpoint>();
        assert!(ctx.registry().is_resolved::<ApiEndpoint>());
    }

    #[test]
    fn distinct_contexts_resolve_independently() {
        let ctx1 = Context::new();
        let ctx2 = Context::new();
        ctx1.set_override::<Mandatory>(|_| Mandatory(1));
        ctx2.set_override::<Mandatory>(|_| Mandatory(2));
        assert_eq!(ctx1.resolve::<Mandatory>().expect("override").0, 1);
        assert_eq!(ctx2.resolve::<Mandatory>().expect("override").0, 2);
    }
}
