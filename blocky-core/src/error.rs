/// Error types shared by the engine and its graphics backends
use thiserror::Error;

/// Convenience result type for rasterizer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Failures reported by a graphics backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The drawing surface or its graphics context could not be acquired.
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),

    /// A shader stage failed to compile.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// The shader program failed to link, or a required variable is missing.
    #[error("shader program link failed: {0}")]
    ProgramLink(String),

    /// A vertex buffer could not be created or filled.
    #[error("vertex buffer allocation failed: {0}")]
    BufferAllocation(String),
}

impl RenderError {
    pub fn context(msg: impl Into<String>) -> Self {
        Self::ContextUnavailable(msg.into())
    }

    pub fn shader(msg: impl Into<String>) -> Self {
        Self::ShaderCompile(msg.into())
    }

    pub fn link(msg: impl Into<String>) -> Self {
        Self::ProgramLink(msg.into())
    }

    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::BufferAllocation(msg.into())
    }

    /// Initialization failures end the session; everything else only costs
    /// the current submission.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::BufferAllocation(_))
    }
}
