// Background capture thread: opens the device, keeps grabbing frames and
// publishes the newest one into a shared slot.
// Visual expectation: the window keeps refreshing while a camera opens, and
// every tick shows the freshest frame without waiting for the device.
//
// The device state `S` is created, used and dropped on the worker thread only,
// so it does not need to be `Send`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::camera::CaptureHandle;
use crate::error::Error;
use crate::types::{FacingMode, PixelBuffer};

/// Pause after a failed grab before trying again.
const RETRY_DELAY: Duration = Duration::from_millis(10);

type FrameSlot = Arc<Mutex<Option<PixelBuffer>>>;

pub struct CaptureWorker {
    facing: FacingMode,
    name: String,
    stop_signal: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
    opened_rx: Receiver<Result<(), Error>>,
    slot: FrameSlot,
    /// Newest frame already taken out of the slot; redrawn until a newer one lands.
    latest: Option<PixelBuffer>,
    opened: bool,
    stopped: bool,
}

impl CaptureWorker {
    /// Start the worker. Returns at once; `poll_open` reports how opening went.
    ///
    /// * `open` - runs first on the worker thread and creates the device state
    /// * `grab` - called in a loop; may block until the device has a frame
    /// * `close` - runs on the worker thread after the stop signal
    pub fn spawn<S, O, G, C>(facing: FacingMode, open: O, mut grab: G, close: C) -> Self
    where
        O: FnOnce() -> Result<S, Error> + Send + 'static,
        G: FnMut(&mut S) -> Result<PixelBuffer, Error> + Send + 'static,
        C: FnOnce(S) + Send + 'static,
    {
        let name = format!("capture-{facing}");
        let stop_signal = Arc::new(AtomicBool::new(false));
        let slot: FrameSlot = Arc::new(Mutex::new(None));
        let (opened_tx, opened_rx) = mpsc::channel();

        let thread_stop = Arc::clone(&stop_signal);
        let thread_slot = Arc::clone(&slot);
        let thread_name = name.clone();

        info!(name = %name, "starting capture thread");
        let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
            let mut state = match open() {
                Ok(s) => {
                    let _ = opened_tx.send(Ok(()));
                    s
                }
                Err(e) => {
                    warn!(name = %thread_name, error = %e, "open failed");
                    let _ = opened_tx.send(Err(e));
                    return;
                }
            };

            while !thread_stop.load(Ordering::SeqCst) {
                match grab(&mut state) {
                    Ok(frame) => {
                        *thread_slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
                    }
                    Err(e) => {
                        warn!(name = %thread_name, "frame grab failed: {e}");
                        thread::sleep(RETRY_DELAY);
                    }
                }
            }

            close(state);
            debug!(name = %thread_name, "capture thread exiting");
        });

        // On spawn failure the sender is dropped with the closure; `poll_open`
        // then sees a disconnected channel and reports it as an acquisition error.
        let thread_handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(name = %name, "spawning capture thread: {e}");
                None
            }
        };

        Self {
            facing,
            name,
            stop_signal,
            thread_handle,
            opened_rx,
            slot,
            latest: None,
            opened: false,
            stopped: false,
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "waiting for capture thread");
            if handle.join().is_err() {
                warn!(name = %self.name, "capture thread panicked");
            }
        }
    }
}

impl CaptureHandle for CaptureWorker {
    fn poll_open(&mut self) -> Result<bool, Error> {
        if self.opened {
            return Ok(true);
        }
        if self.stopped {
            return Ok(false);
        }
        match self.opened_rx.try_recv() {
            Ok(Ok(())) => {
                self.opened = true;
                info!(name = %self.name, "camera stream started");
                Ok(true)
            }
            Ok(Err(e)) => {
                self.stopped = true;
                self.join();
                Err(e)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => {
                self.stopped = true;
                self.join();
                Err(Error::acquisition(
                    self.facing,
                    "capture thread exited before the camera opened",
                ))
            }
        }
    }

    fn try_frame(&mut self) -> Option<&PixelBuffer> {
        if !self.is_live() {
            return None;
        }
        let fresh = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if fresh.is_some() {
            self.latest = fresh;
        }
        self.latest.as_ref()
    }

    fn stop(&mut self) {
        if self.stopped && self.thread_handle.is_none() {
            return;
        }
        self.stopped = true;
        self.stop_signal.store(true, Ordering::SeqCst);
        // Waits for at most one in-flight grab, then the device is released.
        self.join();
        info!(name = %self.name, "camera stream stopped");
    }

    fn is_live(&self) -> bool {
        self.opened && !self.stopped
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
