#![forbid(unsafe_code)]

//! Gesture event fan-out.
//!
//! The host recognizes gestures with whatever platform machinery it has and
//! calls [`GestureService::emit`]; everything downstream observes the
//! [`Signal`]. Events are discrete, so this is a signal, not a cell: there is
//! no "current gesture" to read back.

use std::rc::Rc;

use crate::context::Context;
use crate::error::ContextError;
use crate::reactive::{Signal, Subscription};
use crate::service::{Service, ServiceCore};

/// What kind of gesture was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GestureKind {
    Tap,
    DoubleTap,
    Drag,
    LongPress,
    Pinch,
    Rotate,
    Hover,
}

/// Horizontal third of the view the gesture landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GestureRegion {
    Left,
    Center,
    Right,
}

/// Phase of a continuous gesture. Discrete gestures emit a single `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
}

/// One recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub region: GestureRegion,
    pub phase: GesturePhase,
}

impl GestureEvent {
    /// A completed single tap in `region`.
    #[must_use]
    pub fn tap(region: GestureRegion) -> Self {
        Self {
            kind: GestureKind::Tap,
            region,
            phase: GesturePhase::Ended,
        }
    }
}

/// Broadcast channel for recognized gestures.
pub struct GestureService {
    core: ServiceCore,
    events: Signal<GestureEvent>,
}

impl Service for GestureService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        Ok(Self {
            core: ServiceCore::new(ctx),
            events: Signal::new(),
        })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl GestureService {
    /// Host entry point: publish a recognized gesture to all observers.
    pub fn emit(&self, event: GestureEvent) {
        tracing::trace!(?event, "gesture");
        self.events.emit(event);
        self.core.mark_changed();
    }

    /// Observe every gesture.
    #[must_use]
    pub fn observe(&self, f: impl Fn(&GestureEvent) + 'static) -> Subscription {
        self.events.subscribe(f)
    }

    /// Observe completed taps only.
    #[must_use]
    pub fn observe_taps(&self, f: impl Fn(GestureRegion) + 'static) -> Subscription {
        self.events.subscribe(move |event| {
            if event.kind == GestureKind::Tap && event.phase == GesturePhase::Ended {
                f(event.region);
            }
        })
    }
}
