use thiserror::Error;

/// Core error types for fwflat
#[derive(Debug, Error)]
pub enum Error {
    /// Resource text is not valid JSON, does not match the expected shape,
    /// or is missing a mandatory field
    #[error("Malformed input in {field}: {message}")]
    MalformedInput { field: String, message: String },

    /// A port token is neither a decimal integer nor a `low-high` range
    #[error("Invalid port spec {spec:?}: {reason}")]
    InvalidPortSpec { spec: String, reason: PortSpecError },

    /// Options file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Options file or record export (de)serialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a single port token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortSpecError {
    #[error("empty port token")]
    Empty,

    #[error("not a decimal port number")]
    NotANumber,

    #[error("port number exceeds {max}", max = u32::MAX)]
    Overflow,

    #[error("range must have exactly one '-' between two numbers")]
    BadRange,

    #[error("range start {start} is greater than range end {end}")]
    Inverted { start: u32, end: u32 },
}

impl Error {
    pub(crate) fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn port_spec(spec: impl Into<String>, reason: PortSpecError) -> Self {
        Self::InvalidPortSpec {
            spec: spec.into(),
            reason,
        }
    }

    /// Returns `true` for [`Error::MalformedInput`]
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }

    /// Returns `true` for [`Error::InvalidPortSpec`]
    pub fn is_invalid_port_spec(&self) -> bool {
        matches!(self, Self::InvalidPortSpec { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
