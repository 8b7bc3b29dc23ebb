#![forbid(unsafe_code)]

//! Transport control chrome: visibility state machine plus per-status slot
//! configuration.
//!
//! Visibility is governed by a [`DisplayStyle`]. `Always` and `Never` pin
//! the state; `Auto` toggles on center taps and re-arms a cancellable
//! auto-hide timer on every transition into presented; `Manual` toggles with
//! no timer; `Custom` ignores taps entirely and moves only through
//! [`ControlService::present`] / [`ControlService::dismiss`].
//!
//! Layout is a grid of named [`ControlSlot`]s configured per
//! [`ScreenStatus`]. [`ControlService::compose`] reads the status fresh on
//! every call — a rotation between two composes changes which configuration
//! is selected, with no cached stale copy.
//!
//! # Invariants
//!
//! 1. `presented` never republishes when already in the target state.
//! 2. In `Auto`, every transition into presented (tap or `present()`)
//!    restarts the full auto-hide duration; `present()` while presented
//!    restarts it too.
//! 3. `set_display_style` cancels any pending hide timer before applying
//!    the new style's initial state.
//! 4. Center taps are observed, never consumed: other gesture observers
//!    still see them regardless of display style.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use vpkit_core::source::{GestureService, ScreenStatus, StatusService};
use vpkit_core::{
    CellReader, Context, ContextError, Service, ServiceCore, StateCell, StateSync, TimerHandle,
};

use crate::types::{ContentBuilder, ContentItem, Insets, LayoutComposer, Shadow, Transition};

/// Default auto-hide delay for [`DisplayStyle::auto`].
pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_secs(5);

/// Visibility policy for the control chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayStyle {
    /// Pinned visible; taps and programmatic calls are no-ops.
    Always,
    /// Pinned hidden; taps and programmatic calls are no-ops.
    Never,
    /// Tap toggles; every show re-arms the auto-hide timer.
    Auto {
        first_appear: bool,
        duration: Duration,
    },
    /// Tap toggles; no timer.
    Manual { first_appear: bool },
    /// Only `present()`/`dismiss()` move the state; taps are ignored here
    /// but stay observable by other services.
    Custom,
}

impl DisplayStyle {
    /// `Auto` with the default hide delay, initially visible.
    #[must_use]
    pub fn auto() -> Self {
        Self::Auto {
            first_appear: true,
            duration: DEFAULT_AUTO_HIDE,
        }
    }

    fn initial_presented(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never | Self::Custom => false,
            Self::Auto { first_appear, .. } | Self::Manual { first_appear } => first_appear,
        }
    }
}

impl Default for DisplayStyle {
    fn default() -> Self {
        Self::auto()
    }
}

/// Named positions in the control grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlSlot {
    Top1,
    Top2,
    Left,
    Right,
    Bottom1,
    Bottom2,
    Bottom3,
    Center,
}

/// Configuration of one `(status, slot)` pair.
#[derive(Clone, Default)]
pub struct SlotConfig {
    pub builders: Vec<ContentBuilder>,
    pub composer: Option<LayoutComposer>,
    pub transition: Transition,
    pub shadow: Option<Shadow>,
    pub insets: Insets,
}

/// Result of composing one slot for the current screen status.
pub struct ComposedSlot {
    /// Items produced by the slot's builders, in configuration order.
    pub items: Vec<ContentItem>,
    /// The composer's output, if the slot has one.
    pub composed: Option<ContentItem>,
    pub transition: Transition,
    pub shadow: Option<Shadow>,
    pub insets: Insets,
}

type SlotMap = HashMap<(ScreenStatus, ControlSlot), SlotConfig, ahash::RandomState>;

/// The control chrome state machine.
pub struct ControlService {
    core: ServiceCore,
    presented: StateCell<bool>,
    display_style: Cell<DisplayStyle>,
    hide_timer: RefCell<Option<TimerHandle>>,
    slots: RefCell<SlotMap>,
    status: StateSync<StatusService, ScreenStatus>,
}

impl Service for ControlService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let style = DisplayStyle::default();
        let presented = core.cell(style.initial_presented());
        let status = core.sync(StatusService::status_cell);

        // Wire the center tap at construction. The callback resolves the
        // service through the context at fire time; it cannot fire while we
        // are still inside `create`.
        let gestures = ctx.try_get::<GestureService>()?;
        let handle = core.handle();
        core.hold(gestures.observe_taps(move |region| {
            if region == vpkit_core::source::GestureRegion::Center
                && let Some(ctx) = handle.upgrade()
            {
                ctx.get::<ControlService>().handle_tap();
            }
        }));

        let service = Self {
            core,
            presented,
            display_style: Cell::new(style),
            hide_timer: RefCell::new(None),
            slots: RefCell::new(HashMap::default()),
            status,
        };
        service.arm_hide_timer_if_auto();
        Ok(service)
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl ControlService {
    // --- Visibility ---

    #[must_use]
    pub fn is_presented(&self) -> bool {
        self.presented.get()
    }

    #[must_use]
    pub fn presented_cell(&self) -> CellReader<bool> {
        self.presented.reader()
    }

    #[must_use]
    pub fn display_style(&self) -> DisplayStyle {
        self.display_style.get()
    }

    /// Show the controls. No-op under `Always`/`Never`; under `Auto` this
    /// restarts the hide timer even when already visible.
    pub fn present(&self) {
        match self.display_style.get() {
            DisplayStyle::Always | DisplayStyle::Never => {}
            DisplayStyle::Auto { .. } => {
                if !self.presented.get() {
                    self.presented.set(true);
                }
                self.arm_hide_timer_if_auto();
            }
            DisplayStyle::Manual { .. } | DisplayStyle::Custom => {
                if !self.presented.get() {
                    self.presented.set(true);
                }
            }
        }
    }

    /// Hide the controls. No-op under `Always`/`Never`.
    pub fn dismiss(&self) {
        match self.display_style.get() {
            DisplayStyle::Always | DisplayStyle::Never => {}
            _ => {
                *self.hide_timer.borrow_mut() = None;
                if self.presented.get() {
                    self.presented.set(false);
                }
            }
        }
    }

    /// Replace the display style, cancelling any pending hide timer and
    /// resetting visibility to the new style's initial state.
    pub fn set_display_style(&self, style: DisplayStyle) {
        tracing::debug!(?style, "control display style");
        *self.hide_timer.borrow_mut() = None;
        self.display_style.set(style);

        let target = style.initial_presented();
        if self.presented.get() != target {
            self.presented.set(target);
        }
        self.arm_hide_timer_if_auto();
    }

    fn handle_tap(&self) {
        match self.display_style.get() {
            DisplayStyle::Always | DisplayStyle::Never | DisplayStyle::Custom => {}
            DisplayStyle::Auto { .. } | DisplayStyle::Manual { .. } => {
                if self.presented.get() {
                    self.dismiss();
                } else {
                    self.present();
                }
            }
        }
    }

    /// Arm (or re-arm) the auto-hide timer when the current style is `Auto`
    /// and the controls are visible. Overwriting the stored handle cancels
    /// the previous timer, so this is a debounce.
    fn arm_hide_timer_if_auto(&self) {
        let DisplayStyle::Auto { duration, .. } = self.display_style.get() else {
            return;
        };
        if !self.presented.get() {
            return;
        }

        let handle = self.core.handle();
        let timer = self
            .core
            .context()
            .scheduler()
            .schedule_after(duration, move || {
                if let Some(ctx) = handle.upgrade() {
                    ctx.get::<ControlService>().auto_hide();
                }
            });
        *self.hide_timer.borrow_mut() = Some(timer);
    }

    fn auto_hide(&self) {
        *self.hide_timer.borrow_mut() = None;
        if self.presented.get() {
            self.presented.set(false);
        }
    }

    // --- Slot configuration ---

    /// Install the configuration for one `(status, slot)` pair, replacing
    /// any previous one.
    pub fn configure(&self, status: ScreenStatus, slot: ControlSlot, config: SlotConfig) {
        self.slots.borrow_mut().insert((status, slot), config);
        self.core.mark_changed();
    }

    /// Remove the configuration for one `(status, slot)` pair.
    pub fn clear_slot(&self, status: ScreenStatus, slot: ControlSlot) {
        if self.slots.borrow_mut().remove(&(status, slot)).is_some() {
            self.core.mark_changed();
        }
    }

    /// Build the slot's content for the *current* screen status.
    ///
    /// The status is read fresh through the lazy status binding on every
    /// call; a rotation between two composes selects the other
    /// configuration. Returns `None` when the pair has no configuration.
    ///
    /// Builders run after the internal tables are released, so they may
    /// re-enter the service (e.g. call `is_presented`).
    #[must_use]
    pub fn compose(&self, slot: ControlSlot) -> Option<ComposedSlot> {
        let status = self.status.read();
        let config = self.slots.borrow().get(&(status, slot)).cloned()?;

        let items: Vec<ContentItem> = config.builders.iter().map(|build| build()).collect();
        let composed = config.composer.as_ref().map(|compose| compose(&items));
        Some(ComposedSlot {
            items,
            composed,
            transition: config.transition,
            shadow: config.shadow,
            insets: config.insets,
        })
    }
}
