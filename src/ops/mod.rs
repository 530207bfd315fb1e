pub mod composite;
pub mod transform;

/// Error type for pixel operations.
///
/// Both cases are guarded before any pixel work happens — mismatched inputs
/// never reach the sampling loops.
#[derive(Debug, PartialEq, Eq)]
pub enum OpsError {
    /// Compositing inputs must share dimensions.
    SizeMismatch {
        base: (u32, u32),
        overlay: (u32, u32),
    },
    /// The partner image does not fit inside the target canvas.
    PartnerLarger {
        partner: (u32, u32),
        canvas: (u32, u32),
    },
}

impl std::fmt::Display for OpsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpsError::SizeMismatch { base, overlay } => write!(
                f,
                "composite size mismatch: base {}x{}, overlay {}x{}",
                base.0, base.1, overlay.0, overlay.1
            ),
            OpsError::PartnerLarger { partner, canvas } => write!(
                f,
                "partner image {}x{} exceeds the {}x{} transformed canvas",
                partner.0, partner.1, canvas.0, canvas.1
            ),
        }
    }
}

impl std::error::Error for OpsError {}
