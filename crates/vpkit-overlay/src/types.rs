#![forbid(unsafe_code)]

//! Plain presentation data shared by the overlay services.
//!
//! Content is opaque to this layer: a [`ContentItem`] is whatever view
//! handle the embedding UI toolkit uses, erased behind `Rc<dyn Any>`. The
//! overlay services store and hand these back; only the embedding downcasts.

use std::any::Any;
use std::rc::Rc;

use crate::feature::FeatureDirection;

/// Opaque view handle supplied by the embedding UI layer.
pub type ContentItem = Rc<dyn Any>;

/// Deferred content: called at compose time, on the logical thread.
pub type ContentBuilder = Rc<dyn Fn() -> ContentItem>;

/// Arranges a slot's built content items into one composite view.
pub type LayoutComposer = Rc<dyn Fn(&[ContentItem]) -> ContentItem>;

/// How a plane animates in and out. Interpreted by the embedding renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transition {
    #[default]
    None,
    Fade,
    Scale,
    Slide(FeatureDirection),
}

/// Drop shadow parameters for a floating plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shadow {
    pub blur: f32,
    pub opacity: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            blur: 8.0,
            opacity: 0.3,
        }
    }
}

/// Edge insets in layout points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: f32,
    pub leading: f32,
    pub bottom: f32,
    pub trailing: f32,
}

impl Insets {
    #[must_use]
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            leading: value,
            bottom: value,
            trailing: value,
        }
    }

    #[must_use]
    pub fn horizontal(value: f32) -> Self {
        Self {
            leading: value,
            trailing: value,
            ..Self::default()
        }
    }
}
