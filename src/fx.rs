// Per-frame effects: brightness, channel intensity, blur and color inversion.
// Visual outcomes:
// - Brightness lifts or darkens the whole picture.
// - Red/green/blue intensity tints it (255 = unchanged, 0 = channel gone).
// - Blur softens the whole frame; invert turns it into a photo negative.
//
// Every stage touches R, G and B only. Alpha is never written.

use tracing::trace;

use crate::error::Error;
use crate::surface::{Filter, Surface};
use crate::types::{EffectParams, PixelBuffer};

/// `max(low, min(high, value))`. Total: never panics, even if `low > high`.
#[inline]
pub fn clamp<T: Ord>(value: T, low: T, high: T) -> T {
    value.min(high).max(low)
}

#[inline]
fn to_channel(v: i64) -> u8 {
    clamp(v, 0, 255) as u8
}

/// Add `offset` to R, G and B of every pixel, clamped to 0..=255.
/// Visual: positive = lighter picture, negative = darker; blown-out areas stay white.
pub fn brightness(mut buf: PixelBuffer, offset: i32) -> PixelBuffer {
    if offset == 0 {
        return buf;
    }
    let offset = i64::from(offset);
    for px in buf.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = to_channel(i64::from(*c) + offset);
        }
    }
    buf
}

/// Scale each channel by its own gain: `c * gain / 255`, truncated, then clamped.
/// 255 is identity; gains above 255 amplify.
/// Visual: lowering one gain tints the picture toward the other two colors.
pub fn intensity(mut buf: PixelBuffer, red: i32, green: i32, blue: i32) -> PixelBuffer {
    if (red, green, blue) == (255, 255, 255) {
        return buf;
    }
    let gains = [i64::from(red), i64::from(green), i64::from(blue)];
    for px in buf.pixels_mut() {
        for (c, gain) in px.0[..3].iter_mut().zip(gains) {
            *c = to_channel(i64::from(*c) * gain / 255);
        }
    }
    buf
}

/// `c' = 255 - c` for R, G and B. Applying it twice restores the input.
pub fn invert(mut buf: PixelBuffer) -> PixelBuffer {
    for px in buf.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = 255 - *c;
        }
    }
    buf
}

/// Brightness then intensity on a detached copy; order matters.
pub fn adjust(buf: PixelBuffer, params: &EffectParams) -> PixelBuffer {
    let buf = brightness(buf, params.brightness);
    intensity(buf, params.red, params.green, params.blue)
}

/// Run the effect pipeline over what was just drawn on `surface`:
/// copy to scratch -> brightness -> intensity -> composite back -> optional blur.
/// Visual: the frame on screen is adjusted and tinted, then softened when blur > 0.
/// The surface filter is back to `None` afterwards, so the next draw is sharp again.
pub fn apply_effects(surface: &mut Surface, params: &EffectParams) -> Result<(), Error> {
    trace!(?params, "applying effects");

    let scratch = surface.get_pixels();
    surface.put_pixels(adjust(scratch, params))?;

    if params.blur > 0 {
        // Redraw the surface onto itself with the blur filter, then reset it.
        surface.set_filter(Filter::Blur(params.blur));
        let current = surface.get_pixels();
        surface.draw_image(&current);
        surface.set_filter(Filter::None);
    }
    Ok(())
}

/// Invert the final composited surface in place.
/// Visual: photo negative of whatever the effects produced (not of the raw camera frame).
pub fn apply_invert(surface: &mut Surface) -> Result<(), Error> {
    let pixels = surface.get_pixels();
    surface.put_pixels(invert(pixels))
}
