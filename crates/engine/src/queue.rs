//! Ordered buffer of pending requests with batch dispatch.
//!
//! The service applies a batch in order and later formatting of the same
//! property wins on shared cells. The queue never reorders or merges, so what
//! the caller queued is what the service applies.

use sheetbatch_protocol::BatchResponse;

use crate::error::DispatchError;
use crate::request::PendingRequest;
use crate::transport::Dispatcher;

/// A maximal run of consecutive requests on the same range.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestGroup<'q> {
    pub key: String,
    pub requests: &'q [PendingRequest],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQueue {
    requests: Vec<PendingRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, request: PendingRequest) {
        self.requests.push(request);
    }

    pub fn peek(&self) -> &[PendingRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Runs of consecutive requests sharing a canonical range key.
    /// Concatenating the groups yields [`peek`](Self::peek).
    pub fn groups(&self) -> Vec<RequestGroup<'_>> {
        let mut groups = Vec::new();
        let mut start = 0;
        while start < self.requests.len() {
            let key = self.requests[start].target.canonical_key();
            let mut end = start + 1;
            while end < self.requests.len() && self.requests[end].target.canonical_key() == key {
                end += 1;
            }
            groups.push(RequestGroup { key, requests: &self.requests[start..end] });
            start = end;
        }
        groups
    }

    /// Index pairs `(i, j)`, `i < j`, of requests whose ranges share cells
    /// without being the same range. Tab-level requests are never paired.
    pub fn partial_overlaps(&self) -> Vec<(usize, usize)> {
        let keys: Vec<String> = self.requests.iter().map(|r| r.target.canonical_key()).collect();
        let cells: Vec<bool> = self.requests.iter().map(|r| r.kind.touches_cells()).collect();
        let mut pairs = Vec::new();
        for i in 0..self.requests.len() {
            for j in (i + 1)..self.requests.len() {
                if cells[i]
                    && cells[j]
                    && keys[i] != keys[j]
                    && self.requests[i].target.overlaps(&self.requests[j].target)
                {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Send everything queued as one batch. The queue is cleared only if the
    /// dispatch succeeds. An empty queue sends nothing.
    pub fn flush<D: Dispatcher + ?Sized>(
        &mut self,
        dispatcher: &D,
        document_id: &str,
    ) -> Result<BatchResponse, DispatchError> {
        if self.requests.is_empty() {
            log::debug!("flush: nothing queued for {}", document_id);
            return Ok(BatchResponse::default());
        }

        log::debug!(
            "flush: dispatching {} request(s) in {} group(s) to {}",
            self.requests.len(),
            self.groups().len(),
            document_id
        );
        let response = dispatcher.dispatch(document_id, &self.requests)?;
        self.requests.clear();
        Ok(response)
    }

    /// Drop everything queued without sending it.
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}
