use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stable machine-readable reason codes carried on every error response,
/// shared by participants, the coordinator, and the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    InvalidArgument,
    NotFound,
    Contested,
    Duplicate,
    Unavailable,
    BufferFull,
    Partial,
    Internal,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Contested => "contested",
            Self::Duplicate => "duplicate",
            Self::Unavailable => "unavailable",
            Self::BufferFull => "buffer_full",
            Self::Partial => "partial",
            Self::Internal => "internal",
        }
    }

    /// HTTP status code conventionally associated with this reason.
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::Contested | Self::Duplicate => 409,
            Self::Unavailable => 503,
            Self::BufferFull => 503,
            Self::Partial => 202,
            Self::Internal => 500,
        }
    }
}

/// Error taxonomy shared across every crate boundary in this system. All
/// library crates return this (or a domain-specific `thiserror` enum that
/// converts into it) rather than a bare `String` or `anyhow::Error`.
#[derive(Debug, Error, Clone)]
pub enum FleetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("contested: {0}")]
    Contested(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("region unavailable: {0}")]
    Unavailable(String),

    #[error("buffer full: {0}")]
    BufferFull(String),

    #[error("partial completion: {0}")]
    Partial(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FleetError {
    pub fn reason(&self) -> Reason {
        match self {
            Self::InvalidArgument(_) => Reason::InvalidArgument,
            Self::NotFound(_) => Reason::NotFound,
            Self::Contested(_) => Reason::Contested,
            Self::Duplicate(_) => Reason::Duplicate,
            Self::Unavailable(_) => Reason::Unavailable,
            Self::BufferFull(_) => Reason::BufferFull,
            Self::Partial(_) => Reason::Partial,
            Self::Internal(_) => Reason::Internal,
        }
    }

    /// Human-readable reason text, independent of the machine code.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
