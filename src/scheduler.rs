//! Frame scheduler.
//!
//! One `tick` per animation frame. A tick always advances the clock and the
//! scroll bookkeeping, but only does real work (re-place meshes, push
//! uniforms, render) when the whole-pixel scroll offset changed.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::{ErrorPolicy, GalleryConfig};
use crate::gallery::Gallery;
use crate::layout::Viewport;
use crate::scroll::ScrollSource;

/// Drawing backend. Only one of the two render paths is used for the
/// lifetime of a scheduler.
pub trait Renderer {
    /// Draw the scene straight to the screen.
    fn render_scene(&mut self, gallery: &Gallery) -> anyhow::Result<()>;
    /// Draw the scene through the post-process passes.
    fn composite(&mut self, gallery: &Gallery) -> anyhow::Result<()>;
    fn resize(&mut self, viewport: Viewport) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPath {
    Direct,
    Composite,
}

/// Fixed-step clock. Animation speed therefore follows frame rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderClock {
    elapsed: f32,
    step: f32,
}

impl RenderClock {
    pub fn new(step: f32) -> Self {
        Self { elapsed: 0.0, step }
    }

    pub fn advance(&mut self) -> f32 {
        self.elapsed += self.step;
        self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scroll did not move a whole pixel; nothing was drawn.
    Idle,
    Rendered,
    /// The render failed and the error policy let the loop continue.
    Skipped,
    /// The stop token was set. Nothing ran and the loop should not reschedule.
    Stopped,
}

/// Cancellation flag shared between the frame loop and its owner.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Rc<Cell<bool>>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

pub struct Scheduler {
    clock: RenderClock,
    path: RenderPath,
    policy: ErrorPolicy,
    stop: StopToken,
    frames: u64,
}

impl Scheduler {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            clock: RenderClock::new(config.time_step),
            path: if config.post_processing { RenderPath::Composite } else { RenderPath::Direct },
            policy: config.error_policy,
            stop: StopToken::new(),
            frames: 0,
        }
    }

    /// Share an externally owned stop token with this scheduler.
    pub fn with_stop(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn clock(&self) -> &RenderClock {
        &self.clock
    }

    pub fn path(&self) -> RenderPath {
        self.path
    }

    /// Number of frames actually drawn.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame. `dt` is the wall-clock delta in seconds and only
    /// drives hover tweens. Once the stop token is set every tick returns
    /// [`TickOutcome::Stopped`] without touching the clock, scroll or renderer.
    pub fn tick<S, R>(
        &mut self,
        gallery: &mut Gallery,
        scroll: &mut S,
        renderer: &mut R,
        dt: f32,
    ) -> anyhow::Result<TickOutcome>
    where
        S: ScrollSource + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.stop.is_stopped() {
            return Ok(TickOutcome::Stopped);
        }
        let time = self.clock.advance();
        gallery.registry.advance_tweens(dt);
        gallery.scroll.advance(scroll.poll());

        if !gallery.scroll.moved() {
            return Ok(TickOutcome::Idle);
        }

        log::trace!("render at scroll {:.1}", gallery.scroll.current);
        gallery.sync_positions();
        gallery.post.scroll_speed = gallery.scroll.velocity;
        gallery.post.time = time;
        gallery.registry.push_time(time);

        self.draw(gallery, renderer)
    }

    /// Apply a new viewport and draw once, outside the tick cadence.
    pub fn resize<R>(&mut self, gallery: &mut Gallery, renderer: &mut R, viewport: Viewport) -> anyhow::Result<TickOutcome>
    where
        R: Renderer + ?Sized,
    {
        gallery.resize(viewport);
        renderer.resize(viewport)?;
        self.draw(gallery, renderer)
    }

    fn draw<R>(&mut self, gallery: &Gallery, renderer: &mut R) -> anyhow::Result<TickOutcome>
    where
        R: Renderer + ?Sized,
    {
        let result = match self.path {
            RenderPath::Composite => renderer.composite(gallery),
            RenderPath::Direct => renderer.render_scene(gallery),
        };
        match (result, self.policy) {
            (Ok(()), _) => {
                self.frames += 1;
                Ok(TickOutcome::Rendered)
            }
            (Err(e), ErrorPolicy::SkipTick) => {
                log::warn!("frame skipped: {e:#}");
                Ok(TickOutcome::Skipped)
            }
            (Err(e), ErrorPolicy::Fatal) => Err(e),
        }
    }
}
