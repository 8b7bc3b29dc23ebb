#![forbid(unsafe_code)]

//! Playback state, driven through an injected media backend.
//!
//! The service owns the observable truth (playing, rate, position,
//! duration); the [`MediaBackend`] is the command sink toward the actual
//! player. There is deliberately no production fallback for [`MediaHandle`]:
//! the embedding must register the backend before the service is first
//! constructed, and tests install a recording stub via
//! [`Context::set_override`].

use std::rc::Rc;

use crate::context::Context;
use crate::error::ContextError;
use crate::reactive::{CellReader, StateCell};
use crate::registry::Dependency;
use crate::service::{Service, ServiceCore};

/// Command sink toward the platform media player.
pub trait MediaBackend {
    fn play(&self);
    fn pause(&self);
    fn seek(&self, seconds: f64);
    fn set_rate(&self, rate: f64);
}

/// Injectable handle wrapping the platform backend.
///
/// Mandatory-to-override: no fallback, so constructing [`PlaybackService`]
/// without a registered backend fails with
/// [`ContextError::UnregisteredDependency`].
#[derive(Clone)]
pub struct MediaHandle(pub Rc<dyn MediaBackend>);

impl Dependency for MediaHandle {}

/// Observable playback state plus the commands that drive it.
pub struct PlaybackService {
    core: ServiceCore,
    backend: Rc<MediaHandle>,
    playing: StateCell<bool>,
    rate: StateCell<f64>,
    current_time: StateCell<f64>,
    duration: StateCell<f64>,
}

impl Service for PlaybackService {
    fn create(ctx: &Rc<Context>) -> Result<Self, ContextError> {
        let core = ServiceCore::new(ctx);
        let backend = ctx.resolve::<MediaHandle>()?;
        let playing = core.cell(false);
        let rate = core.cell(1.0);
        let current_time = core.cell(0.0);
        let duration = core.cell(0.0);
        Ok(Self {
            core,
            backend,
            playing,
            rate,
            current_time,
            duration,
        })
    }

    fn core(&self) -> &ServiceCore {
        &self.core
    }
}

impl std::fmt::Debug for PlaybackService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackService")
            .field("playing", &self.playing.get())
            .field("rate", &self.rate.get())
            .field("current_time", &self.current_time.get())
            .field("duration", &self.duration.get())
            .finish_non_exhaustive()
    }
}

impl PlaybackService {
    pub fn play(&self) {
        self.backend.0.play();
        self.playing.set(true);
    }

    pub fn pause(&self) {
        self.backend.0.pause();
        self.playing.set(false);
    }

    pub fn toggle(&self) {
        if self.playing.get() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to an absolute position, clamped to `[0, duration]`.
    pub fn seek(&self, seconds: f64) {
        let target = seconds.clamp(0.0, self.duration.get());
        self.backend.0.seek(target);
        self.current_time.set(target);
    }

    pub fn set_rate(&self, rate: f64) {
        self.backend.0.set_rate(rate);
        self.rate.set(rate);
    }

    /// Host entry point: periodic position report from the player.
    pub fn on_time_tick(&self, seconds: f64) {
        self.current_time.set(seconds);
    }

    /// Host entry point: media duration became known or changed.
    pub fn on_duration(&self, seconds: f64) {
        self.duration.set(seconds);
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    #[must_use]
    pub fn playing_cell(&self) -> CellReader<bool> {
        self.playing.reader()
    }

    #[must_use]
    pub fn rate_cell(&self) -> CellReader<f64> {
        self.rate.reader()
    }

    #[must_use]
    pub fn current_time_cell(&self) -> CellReader<f64> {
        self.current_time.reader()
    }

    #[must_use]
    pub fn duration_cell(&self) -> CellReader<f64> {
        self.duration.reader()
    }
}
