#![forbid(unsafe_code)]

//! Player view bounds, fed by the host layout pass.

use std::rc::Rc;

use crate::context::Context;
use crate::error::ContextError;
use crate::reactive::{CellReader, StateCell};
use crate::service::{Service, ServiceCore};

/// View size in layout points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Canonical cell for the player view's current bounds.
pub struct ViewSizeService {
    core: ServiceCore,
    bounds: StateCell<Size>,
}

impl Service for ViewSizeService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let bounds = core.cell(Size::default());
        Ok(Self { core, bounds })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl ViewSizeService {
    /// Host entry point: record the view's new bounds after layout.
    pub fn update(&self, bounds: Size) {
        self.bounds.set(bounds);
    }

    #[must_use]
    pub fn bounds(&self) -> Size {
        self.bounds.get()
    }

    #[must_use]
    pub fn bounds_cell(&self) -> CellReader<Size> {
        self.bounds.reader()
    }
}
