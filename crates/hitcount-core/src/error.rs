//! Shared error type across hitcount crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Metric key registered twice.
    DuplicateMetric,
    /// Label key repeated within one label set.
    DuplicateLabel,
    /// Registration attempted after the registry was sealed.
    LateRegistration,
    /// Handle does not belong to this registry.
    UnknownMetric,
    /// Non-positive increment.
    InvalidDelta,
    /// Increment would exceed `u64::MAX`.
    CounterOverflow,
    /// Metric name or label key is not a valid identifier.
    InvalidIdentifier,
    /// Exposition text could not be parsed.
    MalformedExposition,
    /// Invalid input / configuration.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::DuplicateMetric => "DUPLICATE_METRIC",
            ClientCode::DuplicateLabel => "DUPLICATE_LABEL",
            ClientCode::LateRegistration => "LATE_REGISTRATION",
            ClientCode::UnknownMetric => "UNKNOWN_METRIC",
            ClientCode::InvalidDelta => "INVALID_DELTA",
            ClientCode::CounterOverflow => "COUNTER_OVERFLOW",
            ClientCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ClientCode::MalformedExposition => "MALFORMED_EXPOSITION",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HitcountError>;

/// Unified error type used by core and service.
#[derive(Debug, Error)]
pub enum HitcountError {
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("duplicate label key {key} on metric {name}")]
    DuplicateLabel { name: String, key: String },
    #[error("registry is sealed, cannot register: {0}")]
    LateRegistration(String),
    #[error("counter not registered in this registry: {0}")]
    UnknownMetric(String),
    #[error("increment delta must be positive, got {0}")]
    InvalidDelta(i64),
    #[error("counter {0} would overflow")]
    CounterOverflow(String),
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("malformed exposition at line {line}: {reason}")]
    MalformedExposition { line: usize, reason: String },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl HitcountError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HitcountError::DuplicateMetric(_) => ClientCode::DuplicateMetric,
            HitcountError::DuplicateLabel { .. } => ClientCode::DuplicateLabel,
            HitcountError::LateRegistration(_) => ClientCode::LateRegistration,
            HitcountError::UnknownMetric(_) => ClientCode::UnknownMetric,
            HitcountError::InvalidDelta(_) => ClientCode::InvalidDelta,
            HitcountError::CounterOverflow(_) => ClientCode::CounterOverflow,
            HitcountError::InvalidIdentifier(_) => ClientCode::InvalidIdentifier,
            HitcountError::MalformedExposition { .. } => ClientCode::MalformedExposition,
            HitcountError::BadRequest(_) => ClientCode::BadRequest,
            HitcountError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            HitcountError::Internal(_) => ClientCode::Internal,
        }
    }
}
