use surfacelog_core_types::RunId;
use thiserror::Error;

/// Result type alias using SurfacelogError
pub type Result<T> = std::result::Result<T, SurfacelogError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log correlation. None of these kinds is fatal
/// to a generation run: the pipeline reports them and moves to the next series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input records
    InvalidInput,
    MissingVersionKey,
    MissingIdentity,
    IdentityCollision,

    // Layouts
    LayoutMismatch,
    UnknownKind,

    // Configuration
    InvalidConfig,

    // Integration
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MissingVersionKey => "ERR_MISSING_VERSION_KEY",
            ExErrorKind::MissingIdentity => "ERR_MISSING_IDENTITY",
            ExErrorKind::IdentityCollision => "ERR_IDENTITY_COLLISION",
            ExErrorKind::LayoutMismatch => "ERR_LAYOUT_MISMATCH",
            ExErrorKind::UnknownKind => "ERR_UNKNOWN_KIND",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context describing where in a series walk the failure happened.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    series_id: Option<String>,
    field: Option<String>,
    version: Option<String>,
    run_id: Option<RunId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            series_id: None,
            field: None,
            version: None,
            run_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add series identity context
    pub fn with_series_id(mut self, id: impl Into<String>) -> Self {
        self.series_id = Some(id.into());
        self
    }

    /// Add field name context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add version context
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
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

    /// Get the series identity context, if any
    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    /// Get the field name context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the version context, if any
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
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
        if let Some(series_id) = &self.series_id {
            write!(f, " (series_id: {})", series_id)?;
        }
        if let Some(version) = &self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for changelog generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfacelogError {
    // ===== Record Errors =====
    /// A record is not a JSON object or is otherwise unusable
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// A record in a series has no usable value under the version key
    #[error("Record in series {series_id} has no `{version_key}` value")]
    MissingVersionKey {
        series_id: String,
        version_key: String,
    },

    /// A record has no usable value under the identity field
    #[error("Record has no `{identity_field}` value")]
    MissingIdentity { identity_field: String },

    /// Two elements of one collection share an identity key
    #[error("Field {field} holds more than one element with identity {identity}")]
    IdentityCollision { field: String, identity: String },

    // ===== Layout Errors =====
    /// A record-level layout is not an `Object` layout
    #[error("Layout for series {series_id} must be an object layout, found {found}")]
    LayoutMismatch { series_id: String, found: String },

    /// No layout is registered for a record's declared kind
    #[error("No layout registered for kind {kind}")]
    UnknownKind { kind: String },

    // ===== Configuration Errors =====
    /// Configuration document could not be parsed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ===== Serialization Errors =====
    /// Serialization or deserialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from SurfacelogError to ExError
impl From<SurfacelogError> for ExError {
    fn from(err: SurfacelogError) -> Self {
        match err {
            SurfacelogError::MissingVersionKey {
                series_id,
                version_key,
            } => ExError::new(ExErrorKind::MissingVersionKey)
                .with_series_id(series_id)
                .with_field(version_key)
                .with_message("Record has no version value"),

            SurfacelogError::InvalidRecord { message } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            SurfacelogError::MissingIdentity { identity_field } => {
                ExError::new(ExErrorKind::MissingIdentity)
                    .with_field(identity_field)
                    .with_message("Record has no identity value")
            }

            SurfacelogError::IdentityCollision { field, identity } => {
                ExError::new(ExErrorKind::IdentityCollision)
                    .with_field(field)
                    .with_message(format!("Duplicate identity {}", identity))
            }

            SurfacelogError::LayoutMismatch { series_id, found } => {
                ExError::new(ExErrorKind::LayoutMismatch)
                    .with_series_id(series_id)
                    .with_message(format!("Expected an object layout, found {}", found))
            }

            SurfacelogError::UnknownKind { kind } => ExError::new(ExErrorKind::UnknownKind)
                .with_message(format!("No layout registered for kind {}", kind)),

            SurfacelogError::InvalidConfig { message } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }

            SurfacelogError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to SurfacelogError
impl From<serde_json::Error> for SurfacelogError {
    fn from(err: serde_json::Error) -> Self {
        SurfacelogError::Serialization {
            message: err.to_string(),
        }
    }
}
