// ============================================================================
// COMPOSITOR — straight-alpha source-over blending
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::ops::OpsError;

/// Source-over composite `overlay` onto `base` (straight alpha).
/// Inputs must share dimensions; a mismatch is a typed error, never
/// undefined pixel behavior.
pub fn composite_over(base: &RgbaImage, overlay: &RgbaImage) -> Result<RgbaImage, OpsError> {
    if base.dimensions() != overlay.dimensions() {
        return Err(OpsError::SizeMismatch {
            base: base.dimensions(),
            overlay: overlay.dimensions(),
        });
    }

    let row_bytes = base.width() as usize * 4;
    let overlay_raw = overlay.as_raw();

    let mut out = base.clone();
    out.as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let over_row = &overlay_raw[y * row_bytes..(y + 1) * row_bytes];
            for px in (0..row_bytes).step_by(4) {
                let top_a = over_row[px + 3];

                // Fast path: fully transparent overlay pixel — base shows through
                if top_a == 0 {
                    continue;
                }
                // Fast path: fully opaque overlay pixel — straight overwrite
                if top_a == 255 {
                    row[px..px + 4].copy_from_slice(&over_row[px..px + 4]);
                    continue;
                }

                let ta = top_a as f32 / 255.0;
                let ba = row[px + 3] as f32 / 255.0;
                let out_a = ta + ba * (1.0 - ta);
                if out_a <= 0.0 {
                    row[px..px + 4].copy_from_slice(&[0, 0, 0, 0]);
                    continue;
                }
                for c in 0..3 {
                    let tc = over_row[px + c] as f32 / 255.0;
                    let bc = row[px + c] as f32 / 255.0;
                    let oc = (tc * ta + bc * ba * (1.0 - ta)) / out_a;
                    row[px + c] = (oc * 255.0).round().clamp(0.0, 255.0) as u8;
                }
                row[px + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let base = solid(4, 4, [0, 0, 0, 255]);
        let overlay = solid(4, 5, [0, 0, 0, 255]);
        let err = composite_over(&base, &overlay).unwrap_err();
        assert_eq!(
            err,
            OpsError::SizeMismatch {
                base: (4, 4),
                overlay: (4, 5),
            }
        );
    }

    #[test]
    fn test_transparent_overlay_leaves_base() {
        let base = solid(3, 3, [40, 80, 120, 255]);
        let overlay = solid(3, 3, [255, 255, 255, 0]);
        let out = composite_over(&base, &overlay).unwrap();
        assert_eq!(out, base);
    }

    #[test]
    fn test_opaque_overlay_replaces_base() {
        let base = solid(3, 3, [40, 80, 120, 255]);
        let overlay = solid(3, 3, [1, 2, 3, 255]);
        let out = composite_over(&base, &overlay).unwrap();
        assert_eq!(out, overlay);
    }

    #[test]
    fn test_half_alpha_blue_over_red_blends_evenly() {
        // Opaque red base, ghosted (alpha 128) blue overlay: each contributes
        // half, the result is opaque.
        let base = solid(2, 2, [255, 0, 0, 255]);
        let overlay = solid(2, 2, [0, 0, 255, 128]);
        let out = composite_over(&base, &overlay).unwrap();
        for p in out.pixels() {
            assert_eq!(p.0, [127, 0, 128, 255]);
        }
    }

    #[test]
    fn test_both_transparent_stays_transparent() {
        let base = solid(2, 1, [9, 9, 9, 0]);
        let overlay = solid(2, 1, [90, 90, 90, 0]);
        let out = composite_over(&base, &overlay).unwrap();
        assert!(out.pixels().all(|p| p[3] == 0));
    }
}
