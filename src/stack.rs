//! Microscopy stack decoding — frame 0 only, behind a narrow seam.
//!
//! The rest of the crate never talks to a container format directly: it asks
//! a [`FrameDecoder`] for the first frame of a file as a raw intensity grid,
//! then normalizes and false-colors it. Tests substitute their own decoder;
//! the production implementation reads grayscale TIFF/STK stacks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::RgbaImage;
use tiff::decoder::{Decoder, DecodingResult};

use crate::colormap;

/// File extensions routed through the intensity pipeline (lowercase).
pub const STACK_EXTENSIONS: &[&str] = &["tif", "tiff", "stk"];

/// Check if a file extension belongs to a microscopy stack format.
pub fn is_stack_extension(ext: &str) -> bool {
    STACK_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Frame 0 of a stack, decoded to raw intensity samples (row-major,
/// `samples.len() == width * height`).
#[derive(Clone, Debug)]
pub struct IntensityFrame {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<f32>,
}

/// Error type for stack decoding.
#[derive(Debug)]
pub enum StackError {
    Io(std::io::Error),
    Tiff(tiff::TiffError),
    /// The first frame is not a single-channel grayscale plane.
    NotGrayscale { expected: usize, got: usize },
    UnsupportedSampleFormat,
    EmptyFrame,
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackError::Io(e) => write!(f, "I/O error: {}", e),
            StackError::Tiff(e) => write!(f, "TIFF decode error: {}", e),
            StackError::NotGrayscale { expected, got } => write!(
                f,
                "frame 0 is not single-channel grayscale ({} samples for {} pixels)",
                got, expected
            ),
            StackError::UnsupportedSampleFormat => {
                write!(f, "unsupported sample format in frame 0")
            }
            StackError::EmptyFrame => write!(f, "frame 0 has zero pixels"),
        }
    }
}

impl std::error::Error for StackError {}

impl From<std::io::Error> for StackError {
    fn from(e: std::io::Error) -> Self {
        StackError::Io(e)
    }
}

impl From<tiff::TiffError> for StackError {
    fn from(e: tiff::TiffError) -> Self {
        StackError::Tiff(e)
    }
}

/// Narrow decoding seam: `path → first frame as an intensity grid`.
pub trait FrameDecoder {
    fn first_frame(&self, path: &Path) -> Result<IntensityFrame, StackError>;
}

/// Production decoder — first page of a grayscale TIFF/STK stack.
/// Later pages (the rest of the stack) are never read.
pub struct TiffStackDecoder;

impl FrameDecoder for TiffStackDecoder {
    fn first_frame(&self, path: &Path) -> Result<IntensityFrame, StackError> {
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?;
        let (width, height) = decoder.dimensions()?;
        if width == 0 || height == 0 {
            return Err(StackError::EmptyFrame);
        }

        let samples: Vec<f32> = match decoder.read_image()? {
            DecodingResult::U8(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::U16(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I8(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::I16(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::F32(buf) => buf,
            DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        };

        let expected = width as usize * height as usize;
        if samples.len() != expected {
            // Multi-channel page (e.g. an RGB TIFF) — not an intensity stack
            return Err(StackError::NotGrayscale {
                expected,
                got: samples.len(),
            });
        }

        Ok(IntensityFrame {
            width,
            height,
            samples,
        })
    }
}

/// Min-max normalize a frame's samples to [0, 1].
/// A flat frame (max == min) maps to all zeros rather than dividing by zero.
pub fn normalize(frame: &IntensityFrame) -> Vec<f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &s in &frame.samples {
        min = min.min(s);
        max = max.max(s);
    }
    let range = max - min;
    if !(range > 0.0) {
        return vec![0.0; frame.samples.len()];
    }
    frame.samples.iter().map(|&s| (s - min) / range).collect()
}

/// Normalize and false-color a frame into an opaque RGBA image.
pub fn false_color(frame: &IntensityFrame) -> RgbaImage {
    let normalized = normalize(frame);
    let mut raw = Vec::with_capacity(normalized.len() * 4);
    for t in normalized {
        raw.extend_from_slice(&colormap::hot(t));
    }
    // Length is width * height * 4 by construction
    RgbaImage::from_raw(frame.width, frame.height, raw)
        .unwrap_or_else(|| RgbaImage::new(frame.width, frame.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> IntensityFrame {
        let samples = (0..width * height).map(|i| i as f32).collect();
        IntensityFrame {
            width,
            height,
            samples,
        }
    }

    #[test]
    fn test_stack_extension_routing() {
        assert!(is_stack_extension("tif"));
        assert!(is_stack_extension("TIFF"));
        assert!(is_stack_extension("stk"));
        assert!(!is_stack_extension("png"));
        assert!(!is_stack_extension("jpg"));
    }

    #[test]
    fn test_normalize_spans_unit_range() {
        let frame = gradient_frame(4, 3);
        let n = normalize(&frame);
        assert_eq!(n[0], 0.0);
        assert_eq!(n[11], 1.0);
        assert!(n.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_normalize_flat_frame_is_zero() {
        let frame = IntensityFrame {
            width: 2,
            height: 2,
            samples: vec![37.0; 4],
        };
        assert_eq!(normalize(&frame), vec![0.0; 4]);
    }

    #[test]
    fn test_false_color_dimensions_and_opacity() {
        let frame = gradient_frame(5, 4);
        let img = false_color(&frame);
        assert_eq!(img.dimensions(), (5, 4));
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_false_color_extremes() {
        let frame = gradient_frame(2, 1);
        let img = false_color(&frame);
        // Minimum sample → bottom of the hot ramp, maximum → white
        assert_eq!(img.get_pixel(0, 0).0, [11, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }
}
