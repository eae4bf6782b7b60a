// Every variant states *where* things went wrong.
use crate::types::FacingMode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the window failed
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Opening/starting the camera failed (unavailable, permission denied, busy)
    #[error("camera acquisition error ({facing}): {reason}")]
    Acquisition { facing: FacingMode, reason: String },

    /// Grabbing/decoding a frame from a live stream failed
    #[error("camera frame error: {0}")]
    CameraFrame(String),

    /// A pixel buffer did not match the surface it was written to
    #[error("surface error: {0}")]
    Surface(String),

    /// Encoding or writing the snapshot failed
    #[error("snapshot error: {0}")]
    Snapshot(#[from] image::ImageError),
}

impl Error {
    pub fn acquisition(facing: FacingMode, reason: impl Into<String>) -> Self {
        Self::Acquisition {
            facing,
            reason: reason.into(),
        }
    }

    pub fn camera_frame(msg: impl Into<String>) -> Self {
        Self::CameraFrame(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}
