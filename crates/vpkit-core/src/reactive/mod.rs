#![forbid(unsafe_code)]

//! Reactive state-propagation primitives for VPKit.
//!
//! This module provides the change-tracking building blocks every service is
//! made of:
//!
//! - [`StateCell`]: a shared, version-tracked value slot that publishes to
//!   subscriber callbacks on every write.
//! - [`Signal`]: a value-less publish/subscribe channel for discrete events
//!   (gestures, commands).
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`CellReader`]: a read/subscribe-only view of a cell, handed out by
//!   services so outside code cannot write their state directly.
//! - [`StateSync`]: a lazily wired cross-service observer binding.
//!
//! # Architecture
//!
//! `StateCell<T>` uses `Rc<..>` with interior mutability for single-threaded
//! shared ownership. Notification iterates over a snapshot of the subscriber
//! list taken at delivery time, so unsubscribing mid-pass never affects the
//! in-flight pass.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per write.
//! 2. Subscribers are notified in subscription order.
//! 3. Every write publishes — including a value equal to the current one.
//!    Overlay timers and seek previews rely on observing every intermediate
//!    value, so there is no equality short-circuit.
//! 4. A write issued from inside a notification callback is queued and
//!    delivered after the in-progress pass completes; a burst of N writes
//!    yields N full passes.
//! 5. Dropping a [`Subscription`] removes the callback before the next
//!    delivery pass.

pub mod cell;
pub mod signal;
pub mod sync;

pub use cell::{CellReader, StateCell, Subscription};
pub use signal::Signal;
pub use sync::StateSync;
