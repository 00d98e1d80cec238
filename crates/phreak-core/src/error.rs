//! Unified error types for Phreak

use thiserror::Error;

/// Unified error type for all Phreak operations
///
/// Nothing in here is fatal to the process. Snapshot errors abandon one capture,
/// element errors skip one command.
#[derive(Error, Debug)]
pub enum PhreakError {
    // Capture errors
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Attribute extraction incomplete for node {node}: {detail}")]
    AttributeExtractionPartial { node: usize, detail: String },

    // Command errors
    #[error("Unknown element: {0}")]
    UnknownElement(usize),

    #[error("Browser error: {0}")]
    Browser(String),

    // Planner errors
    #[error("Planner error: {0}")]
    Planner(String),

    #[error("Planner limit reached: {0}")]
    PlannerLimit(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl PhreakError {
    /// Whether the interaction loop can carry on after this error
    ///
    /// Configuration and authentication problems need the user; everything else is
    /// handled at cycle or command granularity.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PhreakError::Config(_) | PhreakError::Auth(_))
    }
}

/// Result type alias using PhreakError
pub type Result<T> = std::result::Result<T, PhreakError>;
