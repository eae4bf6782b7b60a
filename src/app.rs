// Ties the session, controls, surface and frame loop together and drives them
// until the window goes away.

use tracing::{debug, info, warn};

use crate::camera::CaptureBackend;
use crate::controls::{Action, Controls};
use crate::error::Error;
use crate::frame_loop::{Clock, FrameLoop, TickOutcome};
use crate::session::{DiagnosticSink, LoopState, Session};
use crate::snapshot::SnapshotSink;
use crate::surface::Surface;

/// The window side: input, presentation and the cancel signal.
pub trait Host {
    /// False once the user closed the window; ends `App::run`.
    fn is_open(&self) -> bool;
    /// Actions collected since the previous call.
    fn poll_actions(&mut self) -> Vec<Action>;
    /// Show the surface; blocks until the next display refresh.
    fn present(&mut self, surface: &Surface, title: &str) -> Result<(), Error>;
}

pub struct App<B: CaptureBackend, C: Clock> {
    session: Session<B>,
    controls: Controls,
    surface: Surface,
    frames: FrameLoop<C>,
    snapshots: SnapshotSink,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl<B: CaptureBackend, C: Clock> App<B, C> {
    pub fn new(
        session: Session<B>,
        controls: Controls,
        frames: FrameLoop<C>,
        snapshots: SnapshotSink,
        diagnostics: Box<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            session,
            controls,
            surface: Surface::default(),
            frames,
            snapshots,
            diagnostics,
        }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// User-action handlers. They run between ticks, so their effect shows up
    /// from the next tick on.
    pub fn handle(&mut self, action: Action) {
        debug!(?action, "action");
        match action {
            Action::ToggleInvert => {
                self.session.toggle_invert();
            }
            Action::SwitchCamera => self.session.request_switch(),
            Action::RetryCamera => self.session.retry(),
            Action::Snapshot => {
                if let Err(e) = self.snapshots.save(&self.surface) {
                    warn!(path = %self.snapshots.path().display(), "snapshot failed: {e}");
                }
            }
            Action::ToggleControls => {
                self.controls.toggle_visible();
            }
            Action::Select(control) => self.controls.select(control),
            Action::Nudge(steps) => {
                let v = self.controls.nudge(steps);
                debug!(control = self.controls.selected().label(), value = v, "control changed");
            }
        }
    }

    /// Start or check on any pending camera request, then run one tick.
    /// Neither part waits on the camera.
    pub fn step(&mut self) -> Result<TickOutcome, Error> {
        if self.session.has_pending() {
            let state = self.session.poll_acquisition(self.diagnostics.as_mut());
            if state == LoopState::Stopped && !self.session.has_pending() {
                debug!("no camera; frame loop idle until the next request");
            }
        }
        self.frames
            .tick(&mut self.session, &mut self.surface, &self.controls)
    }

    /// Window title: invert button label plus, when shown, the control values.
    pub fn title(&self) -> String {
        let invert_label = if self.session.invert() {
            "Show Original Colors"
        } else {
            "Invert Colors"
        };
        let mut title = format!(
            "Webcam FX | {} camera | [I] {invert_label}",
            self.session.facing()
        );
        if self.session.is_opening() {
            title.push_str(" | opening camera");
        } else if self.session.state() == LoopState::Stopped && !self.session.has_pending() {
            title.push_str(" | no camera ([R] retry, [Tab] switch)");
        }
        if self.controls.visible() {
            title.push_str(" | ");
            title.push_str(&self.controls.summary());
        }
        title
    }

    /// Run until the host closes, then release the camera.
    pub fn run<H: Host>(&mut self, host: &mut H) -> Result<(), Error> {
        info!("frame loop started");
        let result = self.run_inner(host);
        self.session.teardown();
        info!(rendered = self.frames.rendered(), "frame loop finished");
        result
    }

    fn run_inner<H: Host>(&mut self, host: &mut H) -> Result<(), Error> {
        while host.is_open() {
            for action in host.poll_actions() {
                self.handle(action);
            }
            self.step()?;
            let title = self.title();
            host.present(&self.surface, &title)?;
        }
        Ok(())
    }
}
