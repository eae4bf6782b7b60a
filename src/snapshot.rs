// Still-image export of whatever the surface shows right now.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Error;
use crate::surface::Surface;

pub struct SnapshotSink {
    path: PathBuf,
}

impl SnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the surface, effects included, as an image (format from the extension).
    pub fn save(&self, surface: &Surface) -> Result<&Path, Error> {
        surface.pixels().save(&self.path)?;
        info!(path = %self.path.display(), "snapshot saved");
        Ok(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelBuffer;
    use image::Rgba;

    #[test]
    fn writes_the_surface_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SnapshotSink::new(dir.path().join("snapshot.png"));

        let mut surface = Surface::new(8, 6);
        surface
            .put_pixels(PixelBuffer::from_pixel(8, 6, Rgba([1, 2, 3, 255])))
            .unwrap();
        let path = sink.save(&surface).unwrap();

        let read = image::open(path).unwrap().into_rgba8();
        assert_eq!(read, *surface.pixels());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SnapshotSink::new(dir.path().join("missing").join("snapshot.png"));
        let err = sink.save(&Surface::new(2, 2)).unwrap_err();
        assert!(err.to_string().contains("snapshot error"));
    }
}
