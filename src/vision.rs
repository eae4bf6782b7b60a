// Whole-frame box blur used by the surface's blur filter.
// Visual expectation: larger radius = softer image; radius 0 leaves the frame as is.
use crate::types::PixelBuffer;

/// Separable sliding-window box blur over R, G and B.
/// Edges are extended so borders don't darken; alpha is copied through untouched.
pub fn box_blur_rgba(src: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 || src.width() == 0 || src.height() == 0 {
        return src.clone();
    }

    let w = src.width() as usize;
    let h = src.height() as usize;
    // Past the longer side every window already covers the whole row/column
    // plus extended edges; capping keeps the priming loops and sums bounded.
    let r = radius.min(src.width().max(src.height())) as usize;
    let win = (2 * r + 1) as u64; // window width for averaging (constant everywhere)

    let px = src.as_raw();
    let mut tmp = vec![0u8; px.len()];
    let mut out = px.clone(); // alpha already in place; RGB overwritten below

    /* ---- Pass 1: Horizontal (store averaged rows in tmp) ---- */
    for y in 0..h {
        let row = y * w;
        let at = |x: usize| (row + x) * 4;

        // Edge pixel at x=0 counted r+1 times (left side of the first window)
        let mut sum = [0u64; 3];
        for c in 0..3 {
            sum[c] = px[at(0) + c] as u64 * (r as u64 + 1);
        }
        for x in 1..=r {
            let i = at(x.min(w - 1));
            for c in 0..3 {
                sum[c] += px[i + c] as u64;
            }
        }

        for x in 0..w {
            let o = at(x);
            for c in 0..3 {
                tmp[o + c] = (sum[c] / win) as u8;
            }

            // Slide: add the new right pixel, drop the old left one
            let sub = at(x.saturating_sub(r));
            let add = at((x + r + 1).min(w - 1));
            for c in 0..3 {
                sum[c] = sum[c] + px[add + c] as u64 - px[sub + c] as u64;
            }
        }
    }

    /* ---- Pass 2: Vertical (read tmp, write out) ---- */
    for x in 0..w {
        let at = |y: usize| (y * w + x) * 4;

        let mut sum = [0u64; 3];
        for c in 0..3 {
            sum[c] = tmp[at(0) + c] as u64 * (r as u64 + 1);
        }
        for y in 1..=r {
            let i = at(y.min(h - 1));
            for c in 0..3 {
                sum[c] += tmp[i + c] as u64;
            }
        }

        for y in 0..h {
            let o = at(y);
            for c in 0..3 {
                out[o + c] = (sum[c] / win) as u8;
            }

            let sub = at(y.saturating_sub(r));
            let add = at((y + r + 1).min(h - 1));
            for c in 0..3 {
                sum[c] = sum[c] + tmp[add + c] as u64 - tmp[sub + c] as u64;
            }
        }
    }

    // `out` has the same length as the source, so this cannot fail.
    PixelBuffer::from_raw(src.width(), src.height(), out).unwrap_or_else(|| src.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn zero_radius_is_identity() {
        let mut img = PixelBuffer::new(4, 3);
        img.put_pixel(1, 1, Rgba([200, 10, 30, 7]));
        assert_eq!(box_blur_rgba(&img, 0), img);
    }

    #[test]
    fn uniform_frame_stays_uniform() {
        let img = PixelBuffer::from_pixel(16, 9, Rgba([90, 120, 30, 255]));
        let out = box_blur_rgba(&img, 3);
        assert!(out.pixels().all(|p| *p == Rgba([90, 120, 30, 255])));
    }

    #[test]
    fn single_bright_pixel_spreads_to_neighbours() {
        let mut img = PixelBuffer::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        img.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let out = box_blur_rgba(&img, 1);

        let center = out.get_pixel(4, 4)[0];
        let neighbour = out.get_pixel(5, 4)[0];
        let far = out.get_pixel(0, 0)[0];
        assert!(center < 255);
        assert!(neighbour > 0);
        assert_eq!(far, 0);
    }

    #[test]
    fn alpha_is_copied_through() {
        let mut img = PixelBuffer::from_pixel(6, 6, Rgba([50, 50, 50, 128]));
        img.put_pixel(2, 2, Rgba([250, 0, 0, 3]));
        let out = box_blur_rgba(&img, 2);
        for (a, b) in img.pixels().zip(out.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn radius_larger_than_frame_is_safe() {
        let img = PixelBuffer::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let out = box_blur_rgba(&img, 50);
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(*out.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn max_radius_neither_overflows_nor_hangs() {
        let mut img = PixelBuffer::from_pixel(32, 24, Rgba([255, 255, 255, 200]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 9]));
        let out = box_blur_rgba(&img, u32::MAX);
        assert_eq!(out.dimensions(), (32, 24));
        assert_eq!(out.get_pixel(0, 0)[3], 9);
        // The dark corner is washed out; the far corner stays near white.
        assert!(out.get_pixel(0, 0)[0] > 0);
        assert!(out.get_pixel(31, 23)[0] > 200);
    }
}
