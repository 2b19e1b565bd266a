//! The network seam. Views and queues only see these traits; the HTTP
//! implementation lives in `sheetbatch-client`.

use sheetbatch_protocol::BatchResponse;

use crate::error::DispatchError;
use crate::request::PendingRequest;

/// Sends a batch of requests as one call.
pub trait Dispatcher {
    fn dispatch(&self, document_id: &str, batch: &[PendingRequest]) -> Result<BatchResponse, DispatchError>;
}

/// Full service access needed by views.
pub trait Transport: Dispatcher {
    /// Cell data for one range, in qualified notation (`Sheet1!A1:D50`).
    fn fetch_remote(&self, document_id: &str, range_text: &str) -> Result<serde_json::Value, DispatchError>;

    /// Document title and tab properties.
    fn fetch_properties(&self, document_id: &str) -> Result<serde_json::Value, DispatchError>;
}
