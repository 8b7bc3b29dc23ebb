#![forbid(unsafe_code)]

//! Reactive service container core for VPKit.
//!
//! A [`Context`] is the per-session ownership root of a player UI: it lazily
//! constructs singleton [`Service`]s on first access, services publish
//! observable state through [`StateCell`]s, and cross-service dependencies are
//! declared as lazily wired [`StateSync`] bindings. Non-service collaborators
//! (a media backend, a network client) are injected through the
//! [`DependencyRegistry`] so tests can swap them out.
//!
//! # Architecture
//!
//! Everything is single-threaded: cells, services, and the container use
//! `Rc`/`RefCell` shared ownership, and all writes publish synchronously on
//! the calling thread. External asynchronous sources (timers, media time
//! ticks) re-enter through the host-pumped [`Scheduler`], which is the only
//! suspension point in the model.
//!
//! # Invariants
//!
//! 1. At most one instance of each service type exists per context, for the
//!    context's entire lifetime.
//! 2. Services hold only weak back-references to the context; dropping the
//!    context drops every service.
//! 3. A true construction cycle fails with
//!    [`ContextError::CyclicConstruction`] instead of recursing.
//! 4. Every cell write publishes synchronously, in subscription order, before
//!    the write returns.

pub mod context;
pub mod error;
pub mod reactive;
pub mod registry;
pub mod service;
pub mod source;
pub mod time;

pub use context::{Context, ContextHandle};
pub use error::ContextError;
pub use reactive::{CellReader, Signal, StateCell, StateSync, Subscription};
pub use registry::{Dependency, DependencyRegistry};
pub use service::{Service, ServiceCore};
pub use time::{Scheduler, TimerHandle};
