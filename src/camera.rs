// Opens cameras by facing mode and turns their frames into RGBA pixel buffers.
// Visual expectation: once a handle is live, `try_frame()` hands out the newest
// image from the camera, ready to be drawn onto the surface.

use tracing::{debug, info, warn};

use crate::capture_thread::CaptureWorker;
use crate::error::Error;
use crate::types::{FacingMode, PixelBuffer, TARGET_HEIGHT, TARGET_WIDTH};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// A camera stream, from the moment it is requested until it is stopped.
/// None of these calls wait on the device.
pub trait CaptureHandle {
    /// `Ok(true)` once the stream is running, `Ok(false)` while it is still opening,
    /// `Err` if opening failed (unavailable, permission denied, busy).
    fn poll_open(&mut self) -> Result<bool, Error>;
    /// Newest frame delivered so far, or `None` if none has arrived yet.
    fn try_frame(&mut self) -> Option<&PixelBuffer>;
    /// Stop every track of the stream. Idempotent.
    fn stop(&mut self);
    fn is_live(&self) -> bool;
}

/// Something that can start opening a camera for a facing mode.
pub trait CaptureBackend {
    type Handle: CaptureHandle;

    /// Begin acquisition; the result shows up through `CaptureHandle::poll_open`.
    fn acquire(&mut self, facing: FacingMode) -> Self::Handle;
}

/// Maps facing modes onto nokhwa device indices.
pub struct NokhwaBackend {
    user_index: u32,
    environment_index: u32,
}

impl NokhwaBackend {
    pub fn new(user_index: u32, environment_index: u32) -> Self {
        Self {
            user_index,
            environment_index,
        }
    }

    fn index_for(&self, facing: FacingMode) -> u32 {
        match facing {
            FacingMode::User => self.user_index,
            FacingMode::Environment => self.environment_index,
        }
    }
}

impl CaptureBackend for NokhwaBackend {
    type Handle = CaptureWorker;

    fn acquire(&mut self, facing: FacingMode) -> CaptureWorker {
        let index = self.index_for(facing);
        debug!(%facing, index, "opening camera");
        CaptureWorker::spawn(
            facing,
            move || open_camera(index, facing),
            grab_frame,
            close_camera,
        )
    }
}

/// Runs on the capture thread.
fn open_camera(index: u32, facing: FacingMode) -> Result<Camera, Error> {
    let fmt = CameraFormat::new(
        Resolution::new(TARGET_WIDTH, TARGET_HEIGHT),
        FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
        30,
    );
    // Closest match to 640x480; the surface rescales whatever we actually get.
    let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

    let mut cam = Camera::new(CameraIndex::Index(index), req)
        .map_err(|e| Error::acquisition(facing, format!("create camera {index}: {e}")))?;
    cam.open_stream()
        .map_err(|e| Error::acquisition(facing, format!("open stream: {e}")))?;

    let actual = cam.resolution();
    info!(
        %facing,
        index,
        width = actual.width(),
        height = actual.height(),
        "camera opened"
    );
    Ok(cam)
}

/// Runs on the capture thread; blocks until the camera delivers the next frame.
fn grab_frame(cam: &mut Camera) -> Result<PixelBuffer, Error> {
    let frame = cam
        .frame()
        .map_err(|e| Error::camera_frame(format!("fetch frame: {e}")))?;
    let rgb = frame
        .decode_image::<RgbFormat>()
        .map_err(|e| Error::camera_frame(format!("decode RGB: {e}")))?;

    Ok(image::DynamicImage::ImageRgb8(rgb).into_rgba8())
}

fn close_camera(mut cam: Camera) {
    if let Err(e) = cam.stop_stream() {
        warn!("stopping camera stream: {e}");
    }
}

/// In-memory backend for tests: records every handle it gives out.
#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use image::Rgba;

    use super::*;

    #[derive(Debug, Default)]
    pub struct Track {
        pub facing: FacingMode,
        pub opened: bool,
        pub stopped: bool,
        pub frames_served: usize,
    }

    pub type SharedTrack = Rc<RefCell<Track>>;

    #[derive(Default)]
    pub struct FakeBackend {
        /// Facing modes that fail to open, e.g. a denied permission.
        pub deny: Vec<FacingMode>,
        /// How many `poll_open` calls report "still opening" before success.
        pub open_delay: usize,
        pub attempts: Vec<FacingMode>,
        pub tracks: Vec<SharedTrack>,
        /// Frames served by every handle, one per call; the last one repeats.
        /// A solid grey frame if empty.
        pub frames: VecDeque<PixelBuffer>,
        /// When set, handles never have a frame ready.
        pub starved: bool,
    }

    impl FakeBackend {
        pub fn live_count(&self) -> usize {
            self.tracks
                .iter()
                .filter(|t| {
                    let t = t.borrow();
                    t.opened && !t.stopped
                })
                .count()
        }
    }

    pub struct FakeHandle {
        track: SharedTrack,
        denied: bool,
        polls_left: usize,
        frames: VecDeque<PixelBuffer>,
        latest: Option<PixelBuffer>,
        starved: bool,
    }

    impl CaptureBackend for FakeBackend {
        type Handle = FakeHandle;

        fn acquire(&mut self, facing: FacingMode) -> FakeHandle {
            self.attempts.push(facing);
            let track = Rc::new(RefCell::new(Track {
                facing,
                ..Track::default()
            }));
            self.tracks.push(Rc::clone(&track));
            FakeHandle {
                track,
                denied: self.deny.contains(&facing),
                polls_left: self.open_delay,
                frames: self.frames.clone(),
                latest: None,
                starved: self.starved,
            }
        }
    }

    impl CaptureHandle for FakeHandle {
        fn poll_open(&mut self) -> Result<bool, Error> {
            let facing = self.track.borrow().facing;
            if self.denied {
                return Err(Error::acquisition(facing, "permission denied"));
            }
            if self.polls_left > 0 {
                self.polls_left -= 1;
                return Ok(false);
            }
            self.track.borrow_mut().opened = true;
            Ok(true)
        }

        fn try_frame(&mut self) -> Option<&PixelBuffer> {
            if self.starved || !self.is_live() {
                return None;
            }
            self.track.borrow_mut().frames_served += 1;
            let next = if self.frames.len() > 1 {
                self.frames.pop_front()
            } else {
                self.frames.front().cloned()
            };
            self.latest = Some(next.unwrap_or_else(|| {
                PixelBuffer::from_pixel(TARGET_WIDTH, TARGET_HEIGHT, Rgba([100, 100, 100, 255]))
            }));
            self.latest.as_ref()
        }

        fn stop(&mut self) {
            self.track.borrow_mut().stopped = true;
        }

        fn is_live(&self) -> bool {
            let t = self.track.borrow();
            t.opened && !t.stopped
        }
    }
}
