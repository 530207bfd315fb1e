// ============================================================================
// TRANSFORM OPERATIONS — expanding rotation, translation, centered padding
// ============================================================================

use image::{RgbaImage, imageops};
use rayon::prelude::*;

use crate::ops::OpsError;

/// Canvas size bounding an image rotated by `degrees` about its center.
/// Computed in f64 and rounded so right-angle rotations swap the dimensions
/// exactly instead of picking up a one-pixel float error.
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (sin, cos) = f64::from(degrees).to_radians().sin_cos();
    let w = f64::from(width);
    let h = f64::from(height);
    let new_w = (w * cos.abs() + h * sin.abs()).round().max(1.0) as u32;
    let new_h = (w * sin.abs() + h * cos.abs()).round().max(1.0) as u32;
    (new_w, new_h)
}

/// Rotate counter-clockwise about the image center, expanding the canvas to
/// the rotated bounding box so no corner is cropped. Bilinear sampling;
/// uncovered pixels stay fully transparent.
pub fn rotate_expand(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (dst_w, dst_h) = rotated_bounds(src.width(), src.height(), degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let cx_src = src.width() as f32 * 0.5;
    let cy_src = src.height() as f32 * 0.5;
    let cx_dst = dst_w as f32 * 0.5;
    let cy_dst = dst_h as f32 * 0.5;

    let src_w = src.width() as i32;
    let src_h = src.height() as i32;
    let src_stride = src_w as usize * 4;
    let src_raw = src.as_raw();

    let mut dst = RgbaImage::new(dst_w, dst_h);
    let row_bytes = dst_w as usize * 4;

    // Inverse mapping, one rayon task per destination row.
    dst.as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(dy, row)| {
            let vy = dy as f32 + 0.5 - cy_dst;
            for dx in 0..dst_w as usize {
                let vx = dx as f32 + 0.5 - cx_dst;

                // Inverse of a visually counter-clockwise rotation in
                // y-down pixel coordinates.
                let sx = vx * cos - vy * sin + cx_src - 0.5;
                let sy = vx * sin + vy * cos + cy_src - 0.5;

                let x0 = sx.floor() as i32;
                let y0 = sy.floor() as i32;
                if x0 < -1 || y0 < -1 || x0 >= src_w || y0 >= src_h {
                    continue; // stays transparent
                }
                let fx = sx - x0 as f32;
                let fy = sy - y0 as f32;

                let sample = |px: i32, py: i32| -> [f32; 4] {
                    if px < 0 || py < 0 || px >= src_w || py >= src_h {
                        [0.0; 4]
                    } else {
                        let idx = py as usize * src_stride + px as usize * 4;
                        [
                            src_raw[idx] as f32,
                            src_raw[idx + 1] as f32,
                            src_raw[idx + 2] as f32,
                            src_raw[idx + 3] as f32,
                        ]
                    }
                };

                let tl = sample(x0, y0);
                let tr = sample(x0 + 1, y0);
                let bl = sample(x0, y0 + 1);
                let br = sample(x0 + 1, y0 + 1);

                let out = dx * 4;
                for c in 0..4 {
                    let top = tl[c] + (tr[c] - tl[c]) * fx;
                    let bot = bl[c] + (br[c] - bl[c]) * fx;
                    row[out + c] = (top + (bot - top) * fy).round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    dst
}

/// Shift image content by `(dx, dy)` on the same canvas. Inverse-affine
/// semantics: output `(x, y)` reads input `(x + dx, y + dy)`, so positive
/// offsets move content toward the top-left. Pixels shifted out of the
/// canvas are lost; vacated pixels are transparent.
pub fn translate(src: &RgbaImage, dx: i32, dy: i32) -> RgbaImage {
    let w = src.width() as i32;
    let h = src.height() as i32;
    let row_bytes = src.width() as usize * 4;
    let src_raw = src.as_raw();

    let mut dst = RgbaImage::new(src.width(), src.height());
    dst.as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = y as i32 + dy;
            if sy < 0 || sy >= h {
                return;
            }
            // Intersect the shifted scanline with the source row, then copy
            // the overlap in one slice operation.
            let dst_start = (-dx).max(0);
            let dst_end = (w - dx).min(w);
            if dst_start >= dst_end {
                return;
            }
            let a = dst_start as usize * 4;
            let b = dst_end as usize * 4;
            let sa = sy as usize * row_bytes + (dst_start + dx) as usize * 4;
            row[a..b].copy_from_slice(&src_raw[sa..sa + (b - a)]);
        });
    dst
}

/// Center `partner` inside a fully transparent canvas of
/// `canvas_w × canvas_h`, placed at `((canvas - partner) / 2)` per axis
/// (integer division). A partner larger than the canvas in either axis is
/// rejected rather than silently cropped.
pub fn pad_to_canvas(
    partner: &RgbaImage,
    canvas_w: u32,
    canvas_h: u32,
) -> Result<RgbaImage, OpsError> {
    if partner.width() > canvas_w || partner.height() > canvas_h {
        return Err(OpsError::PartnerLarger {
            partner: partner.dimensions(),
            canvas: (canvas_w, canvas_h),
        });
    }
    let off_x = (canvas_w - partner.width()) / 2;
    let off_y = (canvas_h - partner.height()) / 2;

    let mut dst = RgbaImage::new(canvas_w, canvas_h);
    // replace() copies pixels verbatim, alpha included — no blending
    imageops::replace(&mut dst, partner, i64::from(off_x), i64::from(off_y));
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Gradient test image: every pixel unique, fully opaque.
    fn test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 99, 255])
        })
    }

    #[test]
    fn test_right_angle_bounds_swap_exactly() {
        assert_eq!(rotated_bounds(1000, 800, 90.0), (800, 1000));
        assert_eq!(rotated_bounds(1000, 800, -90.0), (800, 1000));
        assert_eq!(rotated_bounds(1000, 800, 180.0), (1000, 800));
    }

    #[test]
    fn test_45_degree_bounds_grow() {
        let (w, h) = rotated_bounds(100, 100, 45.0);
        // 100 * sqrt(2) ≈ 141.42
        assert_eq!(w, 141);
        assert_eq!(h, 141);
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let img = test_image(40, 25);
        let out = rotate_expand(&img, 0.0);
        assert_eq!(out, img);
    }

    #[test]
    fn test_full_turn_matches_zero_within_tolerance() {
        let img = test_image(32, 20);
        let a = rotate_expand(&img, 0.0);
        let b = rotate_expand(&img, 360.0);
        assert_eq!(a.dimensions(), b.dimensions());
        for (pa, pb) in a.pixels().zip(b.pixels()) {
            for c in 0..4 {
                assert!((pa[c] as i16 - pb[c] as i16).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_90_degrees_moves_right_edge_to_top() {
        // 2x1 image: pixel B on the right ends up on top after a CCW turn.
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([10, 0, 0, 255])); // A
        img.put_pixel(1, 0, Rgba([200, 0, 0, 255])); // B
        let out = rotate_expand(&img, 90.0);
        assert_eq!(out.dimensions(), (1, 2));
        assert_eq!(out.get_pixel(0, 0).0, [200, 0, 0, 255]);
        assert_eq!(out.get_pixel(0, 1).0, [10, 0, 0, 255]);
    }

    #[test]
    fn test_translate_shifts_toward_top_left() {
        let img = test_image(10, 8);
        let out = translate(&img, 3, 2);
        // Output (0,0) reads input (3,2)
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(3, 2));
        // The vacated bottom-right strip is transparent
        assert_eq!(out.get_pixel(8, 7).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_translate_negative_offsets() {
        let img = test_image(10, 8);
        let out = translate(&img, -4, -3);
        assert_eq!(out.get_pixel(4, 3), img.get_pixel(0, 0));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_translate_out_of_canvas_is_blank() {
        let img = test_image(6, 6);
        let out = translate(&img, 6, 0);
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_translate_zero_is_identity() {
        let img = test_image(9, 5);
        assert_eq!(translate(&img, 0, 0), img);
    }

    #[test]
    fn test_pad_centers_partner() {
        let img = test_image(4, 4);
        let out = pad_to_canvas(&img, 10, 8).unwrap();
        assert_eq!(out.dimensions(), (10, 8));
        // Offset = ((10-4)/2, (8-4)/2) = (3, 2)
        assert_eq!(out.get_pixel(3, 2), img.get_pixel(0, 0));
        assert_eq!(out.get_pixel(6, 5), img.get_pixel(3, 3));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_pad_same_size_is_identity() {
        let img = test_image(7, 3);
        assert_eq!(pad_to_canvas(&img, 7, 3).unwrap(), img);
    }

    #[test]
    fn test_pad_rejects_oversized_partner() {
        let img = test_image(12, 4);
        let err = pad_to_canvas(&img, 10, 8).unwrap_err();
        assert_eq!(
            err,
            OpsError::PartnerLarger {
                partner: (12, 4),
                canvas: (10, 8),
            }
        );
    }
}
