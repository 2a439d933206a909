use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::http_client::HttpError;

/// Validation errors raised while building domain values from remote payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("dates must be in chronological order (at index {index})")]
    UnorderedDates { index: usize },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("52-week low {min} is above 52-week high {max}")]
    InvalidRange { min: String, max: String },
}

/// The two per-item data kinds fetched from the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    History,
    Prediction,
}

impl DataKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Prediction => "prediction",
        }
    }
}

impl Display for DataKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single history or prediction request that produced no usable data.
///
/// Recovered locally: the corresponding item field simply stays absent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} fetch for {symbol} failed: {reason}")]
pub struct FetchFailed {
    pub symbol: String,
    pub kind: DataKind,
    pub reason: String,
}

impl FetchFailed {
    pub fn new(symbol: impl Into<String>, kind: DataKind, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// The list payload could not be turned into a catalog. Fatal to startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogLoadError {
    #[error("list request failed: {0}")]
    Transport(#[from] HttpError),
    #[error("list endpoint returned status {status}")]
    Status { status: u16 },
    #[error("list payload is not valid JSON: {message}")]
    Decode { message: String },
    #[error("list payload must be a JSON object keyed by symbol")]
    NotAMapping,
    #[error("entry '{symbol}' must be a JSON object")]
    EntryNotAnObject { symbol: String },
    #[error("entry '{symbol}' is missing required field '{field}'")]
    MissingField { symbol: String, field: &'static str },
    #[error("list payload contains an empty symbol key")]
    EmptySymbol,
}

impl From<serde_json::Error> for CatalogLoadError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode {
            message: error.to_string(),
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    CatalogLoad(#[from] CatalogLoadError),

    #[error(transparent)]
    Fetch(#[from] FetchFailed),

    #[error("dashboard event loop has stopped")]
    Stopped,
}
