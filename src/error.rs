//! Error types
//!
//! Caller-facing errors for hub operations, plus the error types reported by
//! the external collaborators (processor pipelines and the monitoring bridge).

use std::error::Error as StdError;

/// Boxed error cause carried through to the caller for diagnostics
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias for hub operations
pub type Result<T> = std::result::Result<T, ManagementError>;

/// Error type for hub operations
#[derive(Debug)]
pub enum ManagementError {
    /// Referenced processor, link, queue manager or session does not exist
    NotFound(String),
    /// Authorization gate failed
    PermissionDenied(String),
    /// Well-formed but semantically invalid request
    InvalidRequest(String),
    /// Underlying pipeline construction or start failed
    ConstructionFailure {
        message: String,
        source: Option<BoxError>,
    },
}

impl ManagementError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        ManagementError::NotFound(what.into())
    }

    pub(crate) fn denied(reason: impl Into<String>) -> Self {
        ManagementError::PermissionDenied(reason.into())
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ManagementError::InvalidRequest(reason.into())
    }

    pub(crate) fn construction(message: impl Into<String>, source: Option<BoxError>) -> Self {
        ManagementError::ConstructionFailure {
            message: message.into(),
            source,
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManagementError::NotFound(_))
    }

    /// Check if this is a permission error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ManagementError::PermissionDenied(_))
    }

    /// Check if this is an invalid-request error
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, ManagementError::InvalidRequest(_))
    }

    /// Check if this is a construction failure
    pub fn is_construction_failure(&self) -> bool {
        matches!(self, ManagementError::ConstructionFailure { .. })
    }
}

impl std::fmt::Display for ManagementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManagementError::NotFound(what) => write!(f, "Not found: {}", what),
            ManagementError::PermissionDenied(reason) => {
                write!(f, "Permission denied: {}", reason)
            }
            ManagementError::InvalidRequest(reason) => write!(f, "Invalid request: {}", reason),
            ManagementError::ConstructionFailure { message, .. } => {
                write!(f, "Processor construction failed: {}", message)
            }
        }
    }
}

impl StdError for ManagementError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ManagementError::ConstructionFailure {
                source: Some(source),
                ..
            } => Some(source.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

impl From<ProcessorError> for ManagementError {
    fn from(err: ProcessorError) -> Self {
        let message = err.message.clone();
        ManagementError::construction(message, Some(Box::new(err)))
    }
}

/// Error reported by a processing pipeline or a session client
#[derive(Debug)]
pub struct ProcessorError {
    message: String,
    source: Option<BoxError>,
}

impl ProcessorError {
    /// Create an error with a message only
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ProcessorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

/// Error reported by the monitoring bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Name is already registered
    AlreadyRegistered(String),
    /// Name is not registered
    NotRegistered(String),
    /// Bridge-specific failure
    Other(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::AlreadyRegistered(name) => write!(f, "Already registered: {}", name),
            BridgeError::NotRegistered(name) => write!(f, "Not registered: {}", name),
            BridgeError::Other(msg) => write!(f, "Bridge error: {}", msg),
        }
    }
}

impl StdError for BridgeError {}
