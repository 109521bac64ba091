/// Typed framework errors.
///
/// Fallible APIs return `anyhow::Result`; these variants travel inside it and
/// can be recovered with `err.downcast_ref::<chuckle_core::Error>()`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation was invoked in a state that does not permit it.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// A GPU resource could not be created.
    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },

    /// The surface reported an unrecoverable condition.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// Reading back the current frame failed.
    #[error("frame capture failed: {0}")]
    Capture(String),

    /// The platform window could not be created or was lost.
    #[error("window error: {0}")]
    Window(String),
}

impl Error {
    /// Returns `true` for `InvalidOperation`.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Error::InvalidOperation(_))
    }
}
