// ============================================================================
// MicroAlign CLI — headless single-pair overlay via command-line arguments
// ============================================================================
//
// Usage examples:
//   microalign --input moving.tif reference.tif --angle 12 --output overlay.png
//   microalign -i a.png b.png --tx 40 --ty -12 -o mask.png --mask-only
//
// No GUI is opened in CLI mode. Exactly one pair and one output per
// invocation; translation offsets are full-resolution pixels and the
// transform runs once against the full images.

use std::path::PathBuf;

use clap::Parser;

use crate::io;
use crate::ops::{composite, transform};
use crate::stack::TiffStackDecoder;

/// MicroAlign headless overlay renderer.
///
/// Apply a fixed rotation/translation to the moving image and write either
/// the transformed image or the ghosted composite — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "microalign",
    about = "MicroAlign headless overlay renderer",
    long_about = "Register one image pair from the command line: rotate and\n\
                  translate the moving image, optionally composite the ghosted\n\
                  reference under it, and write the result as PNG.\n\n\
                  Example:\n  \
                  microalign --input scan.tif atlas.tif --angle 12 --output overlay.png"
)]
pub struct CliArgs {
    /// The two input files: the moving image, then the reference image.
    #[arg(short, long, num_args = 2, value_names = ["MOVING", "REFERENCE"], required = true)]
    pub input: Vec<PathBuf>,

    /// Rotation angle in degrees, counter-clockwise (-180 to 180).
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub angle: f32,

    /// Horizontal translation in full-resolution pixels.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub tx: i32,

    /// Vertical translation in full-resolution pixels.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub ty: i32,

    /// Output file path; `.png` is appended when no extension is given.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Write only the transformed moving image, without the ghosted reference.
    #[arg(long)]
    pub mask_only: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

/// Run one headless overlay render. Returns the process exit code:
/// 0 on success, 1 on failure.
pub fn run(args: CliArgs) -> i32 {
    match render(&args) {
        Ok(path) => {
            println!("wrote {}", path.display());
            0
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            1
        }
    }
}

fn render(args: &CliArgs) -> Result<PathBuf, String> {
    let (moving, reference) = io::load_pair(&args.input[0], &args.input[1], &TiffStackDecoder)
        .map_err(|e| e.to_string())?;

    let rotated = transform::rotate_expand(&moving, args.angle);
    let mask = transform::translate(&rotated, args.tx, args.ty);

    let out = if args.mask_only {
        mask
    } else {
        let padded = transform::pad_to_canvas(&reference, mask.width(), mask.height())
            .map_err(|e| e.to_string())?;
        composite::composite_over(&mask, &padded).map_err(|e| e.to_string())?
    };

    let path = io::ensure_png_extension(args.output.clone());
    io::write_image(&out, &path).map_err(|e| e.to_string())?;
    Ok(path)
}
