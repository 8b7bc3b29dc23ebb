#![forbid(unsafe_code)]

//! Screen presentation status.

use std::rc::Rc;

use crate::context::Context;
use crate::error::ContextError;
use crate::reactive::{CellReader, StateCell};
use crate::service::{Service, ServiceCore};

/// How the player is currently presented on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScreenStatus {
    /// Inline landscape player embedded in a page.
    #[default]
    HalfScreen,
    /// Landscape full screen.
    FullScreen,
    /// Portrait full screen.
    Portrait,
}

/// Canonical cell for the current [`ScreenStatus`].
///
/// The host writes it on rotation and full-screen transitions; overlay
/// services read it fresh (never cached) when selecting per-status
/// configuration.
pub struct StatusService {
    core: ServiceCore,
    status: StateCell<ScreenStatus>,
}

impl Service for StatusService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let status = core.cell(ScreenStatus::default());
        Ok(Self { core, status })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl StatusService {
    /// Host entry point: record a presentation change.
    pub fn set_status(&self, status: ScreenStatus) {
        tracing::debug!(?status, "screen status");
        self.status.set(status);
    }

    #[must_use]
    pub fn status(&self) -> ScreenStatus {
        self.status.get()
    }

    #[must_use]
    pub fn status_cell(&self) -> CellReader<ScreenStatus> {
        self.status.reader()
    }
}
