// The persistent drawing target every tick renders into.
// Behaves like a small 2D canvas: draw an image (scaled to fit), read pixels back,
// write pixels, and an optional blur filter that applies to subsequent draws.

use image::imageops::{self, FilterType};

use crate::error::Error;
use crate::types::{PixelBuffer, TARGET_HEIGHT, TARGET_WIDTH};
use crate::vision::box_blur_rgba;

/// Filter applied by `draw_image`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    None,
    /// Box blur with this radius in pixels.
    Blur(u32),
}

pub struct Surface {
    pixels: PixelBuffer,
    filter: Filter,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: PixelBuffer::new(width, height),
            filter: Filter::None,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[cfg(test)]
    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Draw `image` over the whole surface, stretching it to the surface size,
    /// then run it through the current filter.
    pub fn draw_image(&mut self, image: &PixelBuffer) {
        let scaled = if image.dimensions() == self.pixels.dimensions() {
            image.clone()
        } else {
            imageops::resize(image, self.width(), self.height(), FilterType::Triangle)
        };

        self.pixels = match self.filter {
            Filter::None => scaled,
            Filter::Blur(0) => scaled,
            Filter::Blur(radius) => box_blur_rgba(&scaled, radius),
        };
    }

    /// Copy of the current contents.
    pub fn get_pixels(&self) -> PixelBuffer {
        self.pixels.clone()
    }

    /// Replace the contents; the buffer must match the surface size exactly.
    /// Unlike `draw_image`, no filter is applied.
    pub fn put_pixels(&mut self, pixels: PixelBuffer) -> Result<(), Error> {
        if pixels.dimensions() != self.pixels.dimensions() {
            return Err(Error::surface(format!(
                "put_pixels: {}x{} buffer on a {}x{} surface",
                pixels.width(),
                pixels.height(),
                self.width(),
                self.height()
            )));
        }
        self.pixels = pixels;
        Ok(())
    }

    /// Borrow the current contents (presenting, snapshots).
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(TARGET_WIDTH, TARGET_HEIGHT)
    }
}
