// One tick = draw the current camera frame, run the effects, maybe invert.
// The caller decides when ticks happen (display refresh in the app, by hand in tests).

use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::camera::{CaptureBackend, CaptureHandle};
use crate::controls::ControlSurface;
use crate::error::Error;
use crate::fx;
use crate::session::Session;
use crate::surface::Surface;

/// Time source for tick deltas and the FPS counter.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No live camera; the surface was left alone.
    Idle,
    /// No frame has arrived from the camera yet; the surface was left alone.
    Skipped,
    Rendered,
}

/// Frames-per-second over one-second windows.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
        }
    }

    /// Count one frame. Returns the rate once a full second has passed.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

pub struct FrameLoop<C: Clock = SystemClock> {
    clock: C,
    last_tick: Option<Instant>,
    last_delta: Option<Duration>,
    fps: FpsCounter,
    rendered: u64,
}

impl FrameLoop<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FrameLoop<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FrameLoop<C> {
    pub fn with_clock(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            last_tick: None,
            last_delta: None,
            fps: FpsCounter::new(now),
            rendered: 0,
        }
    }

    #[cfg(test)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Time between the two most recent ticks; varies from tick to tick.
    #[cfg(test)]
    pub fn last_delta(&self) -> Option<Duration> {
        self.last_delta
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Run exactly one tick against `surface`.
    /// Visual: after this returns `Rendered`, the surface holds this tick's processed frame.
    pub fn tick<B, S>(
        &mut self,
        session: &mut Session<B>,
        surface: &mut Surface,
        controls: &S,
    ) -> Result<TickOutcome, Error>
    where
        B: CaptureBackend,
        S: ControlSurface + ?Sized,
    {
        let now = self.clock.now();
        self.last_delta = self.last_tick.map(|t| now.duration_since(t));
        self.last_tick = Some(now);

        let invert = session.invert();
        let Some(handle) = session.handle_mut() else {
            return Ok(TickOutcome::Idle);
        };

        // Never waits on the camera: the capture thread has either delivered
        // something by now or it hasn't.
        let Some(frame) = handle.try_frame() else {
            trace!("no camera frame yet; skipping tick");
            return Ok(TickOutcome::Skipped);
        };

        // 1) video -> surface (stretched to 640x480)
        //    Visual: the raw camera picture fills the window.
        surface.draw_image(frame);

        // 2) surface -> scratch -> brightness/intensity -> surface -> blur
        //    Visual: the picture brightens/tints, then softens if blur > 0.
        let params = controls.read();
        fx::apply_effects(surface, &params)?;

        // 3) invert the composited result
        //    Visual: photo negative while the invert flag is on.
        if invert {
            fx::apply_invert(surface)?;
        }

        self.rendered += 1;
        if let Some(fps) = self.fps.frame(now) {
            info!("FPS: {fps:.1}");
        }
        debug!(?params, invert, delta = ?self.last_delta, "tick rendered");
        Ok(TickOutcome::Rendered)
    }
}
