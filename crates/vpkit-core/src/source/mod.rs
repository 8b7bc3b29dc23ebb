#![forbid(unsafe_code)]

//! Input-side services: the boundary where the host platform feeds the
//! reactive graph.
//!
//! Each service here owns the canonical cell or signal for one kind of
//! external fact (gestures, screen status, view bounds, playback state) and
//! exposes a host-facing entry point that writes it. Consumers never talk to
//! the platform; they observe these services.

mod gesture;
mod playback;
mod status;
mod viewsize;

pub use gesture::{GestureEvent, GestureKind, GesturePhase, GestureRegion, GestureService};
pub use playback::{MediaBackend, MediaHandle, PlaybackService};
pub use status::{ScreenStatus, StatusService};
pub use viewsize::{Size, ViewSizeService};
