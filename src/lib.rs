//! MicroAlign — manual registration of microscopy image pairs.
//!
//! The user loads two images (ordinary raster formats or a grayscale
//! microscopy stack, of which only frame 0 is read), rotates and translates
//! the first over the second with sliders, and exports the transformed image
//! alone or a ghosted composite of both at full resolution.

#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod logger;
pub mod app;
pub mod cli;
pub mod colormap;
pub mod io;
pub mod ops;
pub mod session;
pub mod stack;
