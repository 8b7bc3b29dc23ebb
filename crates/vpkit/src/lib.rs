#![forbid(unsafe_code)]

//! Umbrella crate re-exporting the VPKit toolkit.
//!
//! A player session is one [`Context`]: the host creates it, registers its
//! platform collaborators (a media backend at minimum), feeds it gestures,
//! layout, and clock ticks, and observes the overlay services to draw.
//!
//! ```ignore
//! use vpkit::prelude::*;
//!
//! let ctx = Context::new();
//! ctx.set_override::<MediaHandle>(|_| MediaHandle(platform_backend()));
//!
//! let controls = ctx.get::<ControlService>();
//! let _redraw = controls.core().subscribe_changed(|| request_frame());
//!
//! // per frame:
//! ctx.advance(frame_delta);
//! ```

pub use vpkit_core::{
    CellReader, Context, ContextError, ContextHandle, Dependency, DependencyRegistry, Scheduler,
    Service, ServiceCore, Signal, StateCell, StateSync, Subscription, TimerHandle,
};

pub use vpkit_core::source;
pub use vpkit_overlay as overlay;

/// Everything a typical embedding needs in scope.
pub mod prelude {
    pub use vpkit_core::source::{
        GestureEvent, GestureKind, GesturePhase, GestureRegion, GestureService, MediaBackend,
        MediaHandle, PlaybackService, ScreenStatus, Size, StatusService, ViewSizeService,
    };
    pub use vpkit_core::{
        CellReader, Context, ContextError, Dependency, Service, ServiceCore, Signal, StateCell,
        StateSync, Subscription,
    };
    pub use vpkit_overlay::{
        ANIMATION_SETTLE, ContentBuilder, ContentItem, ControlService, ControlSlot, DisplayStyle,
        FeatureDirection, FeatureHooks, FeatureService, FeatureStyle, Insets, LayoutComposer,
        PluginService, Shadow, SlotConfig, Toast, ToastId, ToastService, Transition,
    };
}
