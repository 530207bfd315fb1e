//! Interactive session state — the single mutable record behind the UI.
//!
//! Every handler reads and writes this record synchronously; there is no
//! other application state. The composite preview is derived and recomputed
//! wholesale on every change, never patched incrementally.

use image::RgbaImage;

use crate::io;
use crate::ops::{OpsError, composite, transform};

/// Default preview scale factor. Full-resolution microscopy frames are far
/// too large to push through the transform on every slider tick.
pub const DEFAULT_SCALE: f32 = 0.05;

/// One loaded image at both resolutions. The invariant throughout the crate:
/// `preview` is the same logical image as `full`, downscaled by the session
/// scale factor.
#[derive(Clone)]
pub struct LoadedImage {
    pub full: RgbaImage,
    pub preview: RgbaImage,
}

impl LoadedImage {
    fn new(full: RgbaImage, scale: f32) -> Self {
        let preview = io::make_preview(&full, scale);
        Self { full, preview }
    }
}

/// The registration pair: `moving` is the image the sliders transform,
/// `reference` stays put (already ghosted at load time).
#[derive(Clone)]
pub struct ImagePair {
    pub moving: LoadedImage,
    pub reference: LoadedImage,
}

/// Slider state, the loaded pair, and the derived composite preview.
pub struct Session {
    pub scale: f32,
    /// Rotation in degrees, [-180, 180].
    pub angle: f32,
    /// Translation in preview pixels, bounded by the preview dimensions.
    pub tx: i32,
    pub ty: i32,
    pub pair: Option<ImagePair>,
    /// Derived alpha-blended preview.
    pub composite: Option<RgbaImage>,
}

impl Session {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            angle: 0.0,
            tx: 0,
            ty: 0,
            pair: None,
            composite: None,
        }
    }

    pub fn has_images(&self) -> bool {
        self.pair.is_some()
    }

    /// Install a freshly loaded pair. Resets the transform to identity and
    /// recomputes the preview; slider ranges follow the new preview
    /// dimensions via [`Session::translation_bounds`].
    pub fn install_pair(
        &mut self,
        moving_full: RgbaImage,
        reference_full: RgbaImage,
    ) -> Result<(), OpsError> {
        self.pair = Some(ImagePair {
            moving: LoadedImage::new(moving_full, self.scale),
            reference: LoadedImage::new(reference_full, self.scale),
        });
        self.angle = 0.0;
        self.tx = 0;
        self.ty = 0;
        self.recompute_preview()
    }

    /// Translation slider bounds: ±preview dimension per axis, so the range
    /// scales with the loaded image.
    pub fn translation_bounds(&self) -> Option<(i32, i32)> {
        self.pair.as_ref().map(|p| {
            (
                p.moving.preview.width() as i32,
                p.moving.preview.height() as i32,
            )
        })
    }

    /// Re-run transform + composite against the preview pair.
    pub fn recompute_preview(&mut self) -> Result<(), OpsError> {
        let Some(pair) = &self.pair else {
            return Ok(());
        };
        let rotated = transform::rotate_expand(&pair.moving.preview, self.angle);
        let moved = transform::translate(&rotated, self.tx, self.ty);
        let padded =
            transform::pad_to_canvas(&pair.reference.preview, moved.width(), moved.height())?;
        self.composite = Some(composite::composite_over(&moved, &padded)?);
        Ok(())
    }

    /// Preview-space translation converted to full-resolution pixels. The
    /// division by the scale factor is what keeps exported alignment in step
    /// with the preview.
    pub fn full_translation(&self) -> (i32, i32) {
        (
            (self.tx as f32 / self.scale).round() as i32,
            (self.ty as f32 / self.scale).round() as i32,
        )
    }

    /// Transformed moving image at full resolution (the mask export).
    /// `None` until a pair is loaded.
    pub fn render_full_mask(&self) -> Option<RgbaImage> {
        let pair = self.pair.as_ref()?;
        let rotated = transform::rotate_expand(&pair.moving.full, self.angle);
        let (dx, dy) = self.full_translation();
        Some(transform::translate(&rotated, dx, dy))
    }

    /// Full-resolution composite (the composite export): transformed moving
    /// image under the centered, ghosted reference.
    pub fn render_full_composite(&self) -> Option<Result<RgbaImage, OpsError>> {
        let pair = self.pair.as_ref()?;
        let mask = self.render_full_mask()?;
        Some(
            transform::pad_to_canvas(&pair.reference.full, mask.width(), mask.height())
                .and_then(|padded| composite::composite_over(&mask, &padded)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    /// 1000x800 opaque red moving image + ghosted blue reference at the
    /// default 0.05 scale.
    fn red_blue_session() -> Session {
        let mut session = Session::new(DEFAULT_SCALE);
        session
            .install_pair(
                solid(1000, 800, [255, 0, 0, 255]),
                solid(1000, 800, [0, 0, 255, 128]),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_install_resets_transform() {
        let mut session = Session::new(DEFAULT_SCALE);
        session.angle = 35.0;
        session.tx = -12;
        session.ty = 7;
        session
            .install_pair(solid(100, 100, [1, 2, 3, 255]), solid(100, 100, [4, 5, 6, 128]))
            .unwrap();
        assert_eq!(session.angle, 0.0);
        assert_eq!((session.tx, session.ty), (0, 0));
    }

    #[test]
    fn test_preview_dimensions_follow_scale() {
        let session = red_blue_session();
        let pair = session.pair.as_ref().unwrap();
        assert_eq!(pair.moving.preview.dimensions(), (50, 40));
        assert_eq!(pair.reference.preview.dimensions(), (50, 40));
    }

    #[test]
    fn test_translation_bounds_match_preview() {
        let session = red_blue_session();
        assert_eq!(session.translation_bounds(), Some((50, 40)));
    }

    #[test]
    fn test_identity_composite_is_uniform_blend() {
        // Rotation 0, translation (0, 0): opaque red under half-alpha blue
        // must come out a uniform 50/50 blend.
        let session = red_blue_session();
        let composite = session.composite.as_ref().unwrap();
        assert_eq!(composite.dimensions(), (50, 40));
        for p in composite.pixels() {
            assert_eq!(p.0, [127, 0, 128, 255]);
        }
    }

    #[test]
    fn test_identity_matches_plain_composite() {
        let session = red_blue_session();
        let pair = session.pair.as_ref().unwrap();
        let plain =
            composite::composite_over(&pair.moving.preview, &pair.reference.preview).unwrap();
        assert_eq!(session.composite.as_ref().unwrap(), &plain);
    }

    #[test]
    fn test_full_translation_divides_by_scale() {
        let mut session = red_blue_session();
        session.tx = 10;
        session.ty = -4;
        assert_eq!(session.full_translation(), (200, -80));
    }

    #[test]
    fn test_mask_canvas_independent_of_translation() {
        let mut session = red_blue_session();
        session.angle = 30.0;
        session.tx = 25;
        session.ty = -10;
        let with_shift = session.render_full_mask().unwrap();
        session.tx = 0;
        session.ty = 0;
        let without_shift = session.render_full_mask().unwrap();
        assert_eq!(with_shift.dimensions(), without_shift.dimensions());
        assert_eq!(
            with_shift.dimensions(),
            transform::rotated_bounds(1000, 800, 30.0)
        );
    }

    #[test]
    fn test_90_degree_mask_swaps_dimensions() {
        let mut session = red_blue_session();
        session.angle = 90.0;
        let mask = session.render_full_mask().unwrap();
        assert_eq!(mask.dimensions(), (800, 1000));
    }

    #[test]
    fn test_full_composite_matches_mask_canvas() {
        let mut session = red_blue_session();
        session.angle = 45.0;
        session.tx = 5;
        let mask = session.render_full_mask().unwrap();
        let composite = session.render_full_composite().unwrap().unwrap();
        assert_eq!(composite.dimensions(), mask.dimensions());
    }

    #[test]
    fn test_render_before_load_is_none() {
        let session = Session::new(DEFAULT_SCALE);
        assert!(session.render_full_mask().is_none());
        assert!(session.render_full_composite().is_none());
        assert!(!session.has_images());
    }

    #[test]
    fn test_recompute_without_pair_is_noop() {
        let mut session = Session::new(DEFAULT_SCALE);
        session.recompute_preview().unwrap();
        assert!(session.composite.is_none());
    }
}
