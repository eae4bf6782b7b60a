// Per-viewer state: the live capture handle, the facing mode and the invert flag.
// Everything the user-action handlers and the frame loop share lives here.

use tracing::{debug, error, info};

use crate::camera::{CaptureBackend, CaptureHandle};
use crate::error::Error;
use crate::types::FacingMode;

/// Where acquisition failures are reported.
pub trait DiagnosticSink {
    fn report(&mut self, error: &Error);
}

/// Logs diagnostics at error level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, err: &Error) {
        error!(error = %err, "camera unavailable");
    }
}

/// Running = a live handle exists and ticks draw frames; Stopped otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

pub struct Session<B: CaptureBackend> {
    backend: B,
    /// The stream ticks draw from; set once opening succeeded.
    handle: Option<B::Handle>,
    /// A stream that is still opening on its capture thread.
    opening: Option<B::Handle>,
    facing: FacingMode,
    /// Acquisition requested but not yet started.
    pending: Option<FacingMode>,
    invert: bool,
}

impl<B: CaptureBackend> Session<B> {
    /// Starts Stopped with an acquisition for `facing` already queued.
    pub fn new(backend: B, facing: FacingMode) -> Self {
        Self {
            backend,
            handle: None,
            opening: None,
            facing,
            pending: Some(facing),
            invert: false,
        }
    }

    pub fn state(&self) -> LoopState {
        match &self.handle {
            Some(h) if h.is_live() => LoopState::Running,
            _ => LoopState::Stopped,
        }
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// A camera request is queued or still opening.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some() || self.opening.is_some()
    }

    pub fn is_opening(&self) -> bool {
        self.opening.is_some()
    }

    /// Flip the invert flag; takes effect from the next tick.
    /// Visual: the next frame shows up as a photo negative (or back to normal).
    pub fn toggle_invert(&mut self) -> bool {
        self.invert = !self.invert;
        info!(invert = self.invert, "invert toggled");
        self.invert
    }

    /// Queue another attempt with the current facing mode (user retry).
    pub fn retry(&mut self) {
        if self.handle.is_none() && !self.has_pending() {
            self.pending = Some(self.facing);
        }
    }

    /// Toggle facing mode. The old stream is stopped right away, so two devices
    /// are never held at once; the new one is started by `poll_acquisition`.
    pub fn request_switch(&mut self) {
        self.facing = self.facing.toggled();
        self.stop_current();
        self.pending = Some(self.facing);
        info!(facing = %self.facing, "camera switch requested");
    }

    /// Start a queued acquisition and check on one in flight, outside any tick.
    /// Never waits on the device. A failure goes to `sink` once and leaves the
    /// session Stopped until the next request.
    pub fn poll_acquisition(&mut self, sink: &mut dyn DiagnosticSink) -> LoopState {
        if let Some(facing) = self.pending.take() {
            // A newer request supersedes whatever was live or opening.
            self.stop_current();
            debug!(%facing, "acquisition started");
            self.opening = Some(self.backend.acquire(facing));
        }

        if let Some(mut opening) = self.opening.take() {
            match opening.poll_open() {
                Ok(true) => {
                    info!(facing = %self.facing, "session running");
                    self.handle = Some(opening);
                }
                Ok(false) => self.opening = Some(opening),
                Err(e) => {
                    opening.stop();
                    sink.report(&e);
                }
            }
        }
        self.state()
    }

    /// The live handle, if Running.
    pub fn handle_mut(&mut self) -> Option<&mut B::Handle> {
        self.handle.as_mut().filter(|h| h.is_live())
    }

    /// Stop the stream and drop any queued acquisition.
    pub fn teardown(&mut self) {
        self.pending = None;
        self.stop_current();
    }

    fn stop_current(&mut self) {
        for mut old in [self.handle.take(), self.opening.take()].into_iter().flatten() {
            old.stop();
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::camera::fake::FakeBackend;

    /// Keeps every report for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        pub reports: Vec<String>,
    }

    impl DiagnosticSink for RecordingSink {
        fn report(&mut self, err: &Error) {
            self.reports.push(err.to_string());
        }
    }

    #[test]
    fn starts_stopped_with_startup_acquisition_queued() {
        let session = Session::new(FakeBackend::default(), FacingMode::User);
        assert_eq!(session.state(), LoopState::Stopped);
        assert!(session.has_pending());
    }

    #[test]
    fn successful_acquisition_runs() {
        let mut session = Session::new(FakeBackend::default(), FacingMode::User);
        let mut sink = RecordingSink::default();
        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Running);
        assert!(sink.reports.is_empty());
        assert!(!session.has_pending());
    }

    #[test]
    fn switch_leaves_exactly_one_live_handle() {
        let mut session = Session::new(FakeBackend::default(), FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);

        session.request_switch();
        // H1 is already released before the new device is opened.
        assert!(session.backend().tracks[0].borrow().stopped);
        assert_eq!(session.backend().live_count(), 0);
        assert_eq!(session.state(), LoopState::Stopped);

        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Running);
        let backend = session.backend();
        assert_eq!(backend.tracks.len(), 2);
        assert_eq!(backend.live_count(), 1);
        assert!(backend.tracks[0].borrow().stopped);
        assert_eq!(backend.tracks[1].borrow().facing, FacingMode::Environment);
        assert_eq!(session.facing(), FacingMode::Environment);
    }

    #[test]
    fn rapid_switches_only_open_the_latest() {
        let mut session = Session::new(FakeBackend::default(), FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);

        session.request_switch();
        session.request_switch();
        session.poll_acquisition(&mut sink);

        let backend = session.backend();
        assert_eq!(backend.attempts, vec![FacingMode::User, FacingMode::User]);
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn permission_denied_reports_once_and_stays_stopped() {
        let backend = FakeBackend {
            deny: vec![FacingMode::User],
            ..FakeBackend::default()
        };
        let mut session = Session::new(backend, FacingMode::User);
        let mut sink = RecordingSink::default();

        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Stopped);
        // No automatic retry.
        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Stopped);
        assert_eq!(sink.reports.len(), 1);
        assert!(sink.reports[0].contains("permission denied"));
        assert_eq!(session.backend().attempts.len(), 1);
        assert!(session.handle_mut().is_none());
    }

    #[test]
    fn retry_after_failure_tries_again() {
        let backend = FakeBackend {
            deny: vec![FacingMode::User],
            ..FakeBackend::default()
        };
        let mut session = Session::new(backend, FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);
        session.retry();
        session.poll_acquisition(&mut sink);
        assert_eq!(session.backend().attempts.len(), 2);
        assert_eq!(sink.reports.len(), 2);
    }

    #[test]
    fn switch_recovers_from_a_failed_camera() {
        let backend = FakeBackend {
            deny: vec![FacingMode::User],
            ..FakeBackend::default()
        };
        let mut session = Session::new(backend, FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);
        session.request_switch();
        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Running);
    }

    #[test]
    fn slow_camera_stays_stopped_until_it_opens() {
        let backend = FakeBackend {
            open_delay: 2,
            ..FakeBackend::default()
        };
        let mut session = Session::new(backend, FacingMode::User);
        let mut sink = RecordingSink::default();

        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Stopped);
        assert!(session.is_opening());
        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Stopped);
        assert_eq!(session.poll_acquisition(&mut sink), LoopState::Running);
        assert!(!session.has_pending());
        assert!(sink.reports.is_empty());
        assert_eq!(session.backend().attempts.len(), 1);
    }

    #[test]
    fn switch_while_opening_cancels_the_first_request() {
        let backend = FakeBackend {
            open_delay: 5,
            ..FakeBackend::default()
        };
        let mut session = Session::new(backend, FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);
        session.request_switch();
        session.poll_acquisition(&mut sink);

        let backend = session.backend();
        assert!(backend.tracks[0].borrow().stopped);
        assert!(!backend.tracks[1].borrow().stopped);
        assert!(session.is_opening());
    }

    #[test]
    fn retry_is_ignored_while_a_request_is_in_flight() {
        let backend = FakeBackend {
            open_delay: 5,
            ..FakeBackend::default()
        };
        let mut session = Session::new(backend, FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);
        session.retry();
        session.poll_acquisition(&mut sink);
        assert_eq!(session.backend().attempts.len(), 1);
    }

    #[test]
    fn invert_toggles() {
        let mut session = Session::new(FakeBackend::default(), FacingMode::User);
        assert!(!session.invert());
        assert!(session.toggle_invert());
        assert!(!session.toggle_invert());
    }

    #[test]
    fn teardown_stops_the_stream() {
        let mut session = Session::new(FakeBackend::default(), FacingMode::User);
        let mut sink = RecordingSink::default();
        session.poll_acquisition(&mut sink);
        session.teardown();
        assert_eq!(session.state(), LoopState::Stopped);
        assert_eq!(session.backend().live_count(), 0);
    }
}
