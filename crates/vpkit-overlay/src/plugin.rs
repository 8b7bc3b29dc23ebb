#![forbid(unsafe_code)]

//! Floating plugin panel: the lightweight sibling of the feature panel.
//!
//! At most one plugin floats above the render surface (a danmaku input box,
//! a vote card). No timers, no lifecycle hooks; just presence and a
//! transition for the renderer.

use std::rc::Rc;

use vpkit_core::{CellReader, Context, ContextError, Service, ServiceCore, StateCell};

use crate::types::{ContentItem, Transition};

/// The currently floating plugin panel.
pub struct ActivePlugin {
    pub content: ContentItem,
    pub transition: Transition,
}

/// The plugin plane state machine.
pub struct PluginService {
    core: ServiceCore,
    current: StateCell<Option<Rc<ActivePlugin>>>,
}

impl Service for PluginService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let current = core.cell(None);
        Ok(Self { core, current })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl PluginService {
    #[must_use]
    pub fn is_presenting(&self) -> bool {
        self.current.with(Option::is_some)
    }

    #[must_use]
    pub fn current(&self) -> Option<Rc<ActivePlugin>> {
        self.current.get()
    }

    #[must_use]
    pub fn current_cell(&self) -> CellReader<Option<Rc<ActivePlugin>>> {
        self.current.reader()
    }

    /// Present a plugin panel, replacing any existing one.
    pub fn present(&self, content: ContentItem, transition: Transition) {
        self.current.set(Some(Rc::new(ActivePlugin {
            content,
            transition,
        })));
    }

    /// Remove the plugin panel. No-op when nothing floats.
    pub fn dismiss(&self) {
        if self.is_presenting() {
            self.current.set(None);
        }
    }
}
