// ============================================================================
// IMAGE I/O — loading the registration pair, native dialogs, PNG export
// ============================================================================

use std::path::{Path, PathBuf};

use image::{RgbaImage, imageops};
use rfd::FileDialog;

use crate::stack::{self, FrameDecoder, StackError};

/// Alpha applied to the reference image so it renders ghosted under the
/// moving image.
pub const GHOST_ALPHA: u8 = 128;

/// Extensions accepted by the generic codec route.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tga", "ico"];

/// Error type for pair loading.
#[derive(Debug)]
pub enum LoadError {
    /// Generic codec failure (bad path, corrupt or unsupported file).
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    /// Stack route failure.
    Stack { path: PathBuf, source: StackError },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Decode { path, source } => {
                write!(f, "could not decode {}: {}", path.display(), source)
            }
            LoadError::Stack { path, source } => {
                write!(f, "could not read stack {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Error type for export writes.
#[derive(Debug)]
pub enum SaveError {
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Encode { path, source } => {
                write!(f, "could not write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SaveError {}

// ---------------------------------------------------------------------------
//  Loading
// ---------------------------------------------------------------------------

/// Load the registration pair at full resolution.
///
/// The moving image keeps its pixels as decoded (opaque for stack files).
/// The reference image is resized to the moving image's dimensions so that
/// compositing is defined pixel-for-pixel, then ghosted to [`GHOST_ALPHA`].
pub fn load_pair(
    moving_path: &Path,
    reference_path: &Path,
    decoder: &dyn FrameDecoder,
) -> Result<(RgbaImage, RgbaImage), LoadError> {
    let moving = load_rgba(moving_path, decoder)?;
    let mut reference = load_rgba(reference_path, decoder)?;

    if reference.dimensions() != moving.dimensions() {
        reference = imageops::resize(
            &reference,
            moving.width(),
            moving.height(),
            imageops::FilterType::Triangle,
        );
    }
    set_alpha(&mut reference, GHOST_ALPHA);
    Ok((moving, reference))
}

/// Decode one file to RGBA. Stack extensions go through the intensity
/// pipeline (frame 0 → normalize → hot ramp); everything else through the
/// generic codec.
pub fn load_rgba(path: &Path, decoder: &dyn FrameDecoder) -> Result<RgbaImage, LoadError> {
    if has_stack_extension(path) {
        let frame = decoder
            .first_frame(path)
            .map_err(|source| LoadError::Stack {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(stack::false_color(&frame))
    } else {
        match image::open(path) {
            Ok(img) => Ok(img.to_rgba8()),
            Err(source) => Err(LoadError::Decode {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Check whether a path should take the stack route.
pub fn has_stack_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| stack::is_stack_extension(&e.to_string_lossy()))
        .unwrap_or(false)
}

/// Overwrite every pixel's alpha channel.
pub fn set_alpha(img: &mut RgbaImage, alpha: u8) {
    for p in img.pixels_mut() {
        p[3] = alpha;
    }
}

/// Downscale by the preview scale factor — the same factor on both axes, so
/// aspect ratio is preserved and preview dimensions are
/// `floor(full * scale)` per axis.
pub fn make_preview(full: &RgbaImage, scale: f32) -> RgbaImage {
    let w = ((full.width() as f32 * scale) as u32).max(1);
    let h = ((full.height() as f32 * scale) as u32).max(1);
    imageops::resize(full, w, h, imageops::FilterType::Triangle)
}

// ---------------------------------------------------------------------------
//  Dialogs
// ---------------------------------------------------------------------------

/// Native open dialog for one source image. Returns `None` on cancel.
pub fn pick_source_image(title: &str) -> Option<PathBuf> {
    let mut all: Vec<&str> = IMAGE_EXTENSIONS.to_vec();
    all.extend_from_slice(stack::STACK_EXTENSIONS);
    FileDialog::new()
        .set_title(title)
        .add_filter("All Supported", &all)
        .add_filter("Microscopy Stacks", stack::STACK_EXTENSIONS)
        .add_filter("Images", IMAGE_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
}

/// Native save dialog defaulting to PNG. Returns `None` on cancel; a chosen
/// path without an extension gets `.png` appended.
pub fn pick_save_path(default_name: &str) -> Option<PathBuf> {
    let path = FileDialog::new()
        .add_filter("PNG Image", &["png"])
        .add_filter("All Files", &["*"])
        .set_file_name(default_name)
        .save_file()?;
    Some(ensure_png_extension(path))
}

/// Append `.png` when the path carries no extension.
pub fn ensure_png_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_none() {
        path.with_extension("png")
    } else {
        path
    }
}

// ---------------------------------------------------------------------------
//  Export
// ---------------------------------------------------------------------------

/// Write an RGBA image to disk; the format follows the extension (PNG by
/// default via the save dialog).
pub fn write_image(img: &RgbaImage, path: &Path) -> Result<(), SaveError> {
    img.save(path).map_err(|source| SaveError::Encode {
        path: path.to_path_buf(),
        source,
    })
}
