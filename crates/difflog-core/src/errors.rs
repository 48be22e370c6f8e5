use thiserror::Error;

/// Result type alias using DiffLogError
pub type Result<T> = std::result::Result<T, DiffLogError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// A value could not be normalized into a snapshot
    Serialization,
    /// The per-instance publish limit was exceeded
    NotificationOverflow,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::NotificationOverflow => "ERR_NOTIFICATION_OVERFLOW",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used by logging and callers that branch on
/// error kind, plus optional context about where the failure happened.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    generation: Option<u64>,
    path: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            generation: None,
            path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the generation number the failing operation would have produced
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Add a JSON pointer locating the offending value
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the generation context, if any
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(generation) = self.generation {
            write!(f, " (generation: {})", generation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for history log operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffLogError {
    /// The serializer rejected the value
    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    /// The value serialized to something other than a mapping
    #[error("Snapshot root must be a JSON object, found {found}")]
    NonObjectRoot { found: String },

    /// The value nests deeper than the canonical serializer accepts
    #[error("Value nests deeper than {limit} levels at {path}")]
    DepthLimitExceeded { limit: usize, path: String },

    /// Too many publish cycles on one history log instance
    #[error("History published too many times: limit of {limit} notification cycles reached")]
    NotificationOverflow { limit: u64, generation: u64 },
}

impl DiffLogError {
    /// Whether this error belongs to the serialization family
    ///
    /// Serialization failures leave the log untouched and the caller may
    /// retry with a different value.
    pub fn is_serialization(&self) -> bool {
        matches!(
            self,
            DiffLogError::Serialization { .. }
                | DiffLogError::NonObjectRoot { .. }
                | DiffLogError::DepthLimitExceeded { .. }
        )
    }
}

impl From<DiffLogError> for ExError {
    fn from(err: DiffLogError) -> Self {
        match err {
            DiffLogError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            DiffLogError::NonObjectRoot { found } => ExError::new(ExErrorKind::Serialization)
                .with_path("")
                .with_message(format!("snapshot root must be an object, found {}", found)),

            DiffLogError::DepthLimitExceeded { limit, path } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_path(path)
                    .with_message(format!("nesting exceeds {} levels", limit))
            }

            DiffLogError::NotificationOverflow { limit, generation } => {
                ExError::new(ExErrorKind::NotificationOverflow)
                    .with_op("publish")
                    .with_generation(generation)
                    .with_message(format!("publish limit of {} reached", limit))
            }
        }
    }
}

/// Conversion from serde_json::Error to DiffLogError
impl From<serde_json::Error> for DiffLogError {
    fn from(err: serde_json::Error) -> Self {
        DiffLogError::Serialization {
            message: err.to_string(),
        }
    }
}
