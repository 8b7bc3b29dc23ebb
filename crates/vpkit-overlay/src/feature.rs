#![forbid(unsafe_code)]

//! Side feature panel: one at a time, with presentation lifecycle hooks.
//!
//! A feature panel (settings, episode list, share sheet) slides in from one
//! edge and either covers the video or squeezes the render area. The state
//! machine is two states, `Idle` and `Presenting`, stored as the
//! `Option`-ness of the `current` cell.
//!
//! Hooks fire around each transition: the `before_*` hook runs synchronously
//! inside the call, the `after_*` hook after [`ANIMATION_SETTLE`] — the
//! embedding's slide animation is assumed settled by then.
//!
//! # Invariants
//!
//! 1. At most one feature is presented.
//! 2. Presenting over an existing panel replaces it silently: the replaced
//!    panel's dismiss hooks do not run, and its pending `after_present` is
//!    cancelled.
//! 3. `dismiss` when idle is a no-op; no hooks fire.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vpkit_core::{CellReader, Context, ContextError, Service, ServiceCore, StateCell, TimerHandle};

use crate::types::{ContentItem, Insets};

/// Delay before `after_*` hooks fire; matches the presentation animation.
pub const ANIMATION_SETTLE: Duration = Duration::from_millis(350);

/// Edge a feature panel enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureDirection {
    Left,
    Right,
    Top,
    Bottom,
}

/// How the panel relates to the render area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureStyle {
    /// Panel floats above the video.
    Cover,
    /// Panel reserves this many layout points along its entry edge.
    Squeeze(f32),
}

/// Optional callbacks around the presentation lifecycle.
#[derive(Clone, Default)]
pub struct FeatureHooks {
    pub before_present: Option<Rc<dyn Fn()>>,
    pub after_present: Option<Rc<dyn Fn()>>,
    pub before_dismiss: Option<Rc<dyn Fn()>>,
    pub after_dismiss: Option<Rc<dyn Fn()>>,
}

/// The currently presented panel.
pub struct ActiveFeature {
    pub direction: FeatureDirection,
    pub style: FeatureStyle,
    pub content: ContentItem,
}

impl ActiveFeature {
    /// Layout-space reservation for the render area. Zero for `Cover`.
    #[must_use]
    pub fn squeeze_insets(&self) -> Insets {
        let FeatureStyle::Squeeze(amount) = self.style else {
            return Insets::default();
        };
        let mut insets = Insets::default();
        match self.direction {
            FeatureDirection::Left => insets.leading = amount,
            FeatureDirection::Right => insets.trailing = amount,
            FeatureDirection::Top => insets.top = amount,
            FeatureDirection::Bottom => insets.bottom = amount,
        }
        insets
    }
}

/// The feature panel state machine.
pub struct FeatureService {
    core: ServiceCore,
    current: StateCell<Option<Rc<ActiveFeature>>>,
    hooks: RefCell<FeatureHooks>,
    hook_timer: RefCell<Option<TimerHandle>>,
}

impl Service for FeatureService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let current = core.cell(None);
        Ok(Self {
            core,
            current,
            hooks: RefCell::new(FeatureHooks::default()),
            hook_timer: RefCell::new(None),
        })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl FeatureService {
    #[must_use]
    pub fn is_presenting(&self) -> bool {
        self.current.with(Option::is_some)
    }

    #[must_use]
    pub fn current(&self) -> Option<Rc<ActiveFeature>> {
        self.current.get()
    }

    #[must_use]
    pub fn current_cell(&self) -> CellReader<Option<Rc<ActiveFeature>>> {
        self.current.reader()
    }

    /// Present a panel, replacing any existing one.
    ///
    /// `before_present` runs synchronously inside this call; `after_present`
    /// fires [`ANIMATION_SETTLE`] later. A replaced panel's dismiss hooks do
    /// not run and its pending `after_present` is cancelled.
    pub fn present(
        &self,
        direction: FeatureDirection,
        style: FeatureStyle,
        content: ContentItem,
        hooks: FeatureHooks,
    ) {
        if self.is_presenting() {
            tracing::debug!("replacing presented feature");
        }
        *self.hook_timer.borrow_mut() = None;

        let after_present = hooks.after_present.clone();
        let before_present = hooks.before_present.clone();
        *self.hooks.borrow_mut() = hooks;

        if let Some(hook) = before_present {
            hook();
        }
        self.current.set(Some(Rc::new(ActiveFeature {
            direction,
            style,
            content,
        })));
        self.schedule_after_hook(after_present);
    }

    /// Dismiss the presented panel. No-op when idle.
    pub fn dismiss(&self) {
        if !self.is_presenting() {
            return;
        }
        *self.hook_timer.borrow_mut() = None;

        let hooks = std::mem::take(&mut *self.hooks.borrow_mut());
        if let Some(hook) = hooks.before_dismiss {
            hook();
        }
        self.current.set(None);
        self.schedule_after_hook(hooks.after_dismiss);
    }

    fn schedule_after_hook(&self, hook: Option<Rc<dyn Fn()>>) {
        let Some(hook) = hook else { return };
        let timer = self
            .core
            .context()
            .scheduler()
            .schedule_after(ANIMATION_SETTLE, move || hook());
        *self.hook_timer.borrow_mut() = Some(timer);
    }
}
