#![forbid(unsafe_code)]

//! Overlay state machines layered above the video render surface.
//!
//! Four services, one per overlay plane, all built on
//! [`vpkit_core`]'s container and cells:
//!
//! - [`ControlService`] — the transport control chrome (play button, seek
//!   bar, …), with per-screen-status slot configuration and auto-hide.
//! - [`FeatureService`] — one side panel at a time (settings, episode list),
//!   with presentation lifecycle hooks.
//! - [`PluginService`] — one lightweight floating panel, no timers or hooks.
//! - [`ToastService`] — transient FIFO notices with independent expiry.
//!
//! The services own state transitions only; rendering and animation belong
//! to the embedding UI layer, which observes the cells and draws.

pub mod control;
pub mod feature;
pub mod plugin;
pub mod toast;
pub mod types;

pub use control::{ComposedSlot, ControlService, ControlSlot, DisplayStyle, SlotConfig};
pub use feature::{
    ActiveFeature, FeatureDirection, FeatureHooks, FeatureService, FeatureStyle, ANIMATION_SETTLE,
};
pub use plugin::{ActivePlugin, PluginService};
pub use toast::{Toast, ToastId, ToastService};
pub use types::{ContentBuilder, ContentItem, Insets, LayoutComposer, Shadow, Transition};
