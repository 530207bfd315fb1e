//! Fixed "hot" false-color ramp for intensity frames.
//!
//! Piecewise-linear ramp running black → red → yellow → white, matching the
//! classic matplotlib `hot` colormap. Input is a normalized intensity in
//! [0, 1]; out-of-range values are clamped.

/// Intensity at which the red channel saturates.
const RED_END: f32 = 0.365_079;
/// Intensity at which the green channel saturates.
const GREEN_END: f32 = 0.746_032;
/// Red channel value at zero intensity (the ramp does not start at black red).
const RED_START: f32 = 0.0416;

/// Map a normalized intensity to an opaque RGBA pixel on the hot ramp.
pub fn hot(t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);

    let r = if t < RED_END {
        RED_START + (1.0 - RED_START) * (t / RED_END)
    } else {
        1.0
    };
    let g = if t < RED_END {
        0.0
    } else if t < GREEN_END {
        (t - RED_END) / (GREEN_END - RED_END)
    } else {
        1.0
    };
    let b = if t < GREEN_END {
        0.0
    } else {
        (t - GREEN_END) / (1.0 - GREEN_END)
    };

    [to_byte(r), to_byte(g), to_byte(b), 255]
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
