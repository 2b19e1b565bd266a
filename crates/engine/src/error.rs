//! Error types for queue dispatch and view operations.

use std::fmt;

use sheetbatch_core::{AddressError, ValueError};

/// A record could not be mapped onto the view's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The view has no cached header row to map record keys through
    MissingHeader,
    /// A record key has no column in the header row
    UnknownColumn(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingHeader => write!(f, "No header row cached; fetch the view before writing records"),
            SchemaError::UnknownColumn(key) => write!(f, "No column named {:?} in the header row", key),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Failure talking to the service. The queue is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No credentials configured
    NotAuthenticated,
    /// Connection failed or timed out
    Network(String),
    /// Non-success status other than a rejection
    Http(u16, String),
    /// The service refused the request (400/422)
    Rejected(String),
    /// Response body could not be decoded
    Parse(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NotAuthenticated => write!(f, "Not authenticated: no saved credentials"),
            DispatchError::Network(msg) => write!(f, "Network error: {}", msg),
            DispatchError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            DispatchError::Rejected(msg) => write!(f, "Request rejected: {}", msg),
            DispatchError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Error from a view operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    Address(AddressError),
    Value(ValueError),
    Schema(SchemaError),
    Dispatch(DispatchError),
    /// Argument outside what the operation accepts
    InvalidArgument(String),
    /// A tab with this title already exists
    DuplicateTab(String),
    /// No tab with this title
    UnknownTab(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::Address(e) => write!(f, "{}", e),
            ViewError::Value(e) => write!(f, "{}", e),
            ViewError::Schema(e) => write!(f, "{}", e),
            ViewError::Dispatch(e) => write!(f, "{}", e),
            ViewError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            ViewError::DuplicateTab(title) => write!(f, "A tab named {:?} already exists", title),
            ViewError::UnknownTab(title) => write!(f, "No tab named {:?}", title),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Address(e) => Some(e),
            ViewError::Value(e) => Some(e),
            ViewError::Schema(e) => Some(e),
            ViewError::Dispatch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AddressError> for ViewError {
    fn from(e: AddressError) -> Self {
        ViewError::Address(e)
    }
}

impl From<ValueError> for ViewError {
    fn from(e: ValueError) -> Self {
        ViewError::Value(e)
    }
}

impl From<SchemaError> for ViewError {
    fn from(e: SchemaError) -> Self {
        ViewError::Schema(e)
    }
}

impl From<DispatchError> for ViewError {
    fn from(e: DispatchError) -> Self {
        ViewError::Dispatch(e)
    }
}
