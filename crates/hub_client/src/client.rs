//! Sheets API HTTP client.
//!
//! Blocking reqwest client. One `batchUpdate` call per flush, plain GETs for
//! cell data and tab properties.

use std::time::Duration;

use sheetbatch_config::Settings;
use sheetbatch_engine::{DispatchError, Dispatcher, PendingRequest, Transport};
use sheetbatch_protocol::{BatchResponse, BatchUpdateRequest, CELL_DATA_FIELDS, PROPERTIES_FIELDS};

use crate::auth::{load_auth, Credentials};

/// Sheets API client (blocking).
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

/// Error constructing a client or touching the credentials file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No saved credentials
    NotAuthenticated,
    /// The HTTP client could not be built
    Build(String),
    /// Credentials file I/O error
    Io(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAuthenticated => write!(f, "Not authenticated: no saved credentials"),
            ClientError::Build(msg) => write!(f, "Failed to create HTTP client: {}", msg),
            ClientError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for DispatchError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotAuthenticated => DispatchError::NotAuthenticated,
            other => DispatchError::Network(other.to_string()),
        }
    }
}

impl SheetsClient {
    /// Create a client using saved credentials and the settings file.
    pub fn from_saved_auth() -> Result<Self, ClientError> {
        let creds = load_auth().ok_or(ClientError::NotAuthenticated)?;
        Self::new(creds, &Settings::load())
    }

    /// Create a client with explicit credentials. An empty `api_base` in the
    /// credentials falls back to `api.baseUrl` from `settings`.
    pub fn new(creds: Credentials, settings: &Settings) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("sheetbatch/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        let api_base = if creds.api_base.is_empty() { settings.api_base_url.clone() } else { creds.api_base };

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: creds.token,
        })
    }

    /// Client against an explicit base URL with default settings.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(Credentials::new(token, base_url), &Settings::default())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn document_url(&self, document_id: &str) -> String {
        format!("{}/spreadsheets/{}", self.api_base, document_id)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::blocking::Response, DispatchError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .map_err(|e| DispatchError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &BatchUpdateRequest,
    ) -> Result<reqwest::blocking::Response, DispatchError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| DispatchError::Network(e.to_string()))?;
        check_status(response)
    }
}

impl Dispatcher for SheetsClient {
    fn dispatch(&self, document_id: &str, batch: &[PendingRequest]) -> Result<BatchResponse, DispatchError> {
        let url = format!("{}:batchUpdate", self.document_url(document_id));
        let body = BatchUpdateRequest { requests: batch.iter().map(PendingRequest::to_wire).collect() };

        log::debug!("POST {} ({} request(s))", url, batch.len());
        let resp = self.post_json(&url, &body)?;
        resp.json::<BatchResponse>().map_err(|e| DispatchError::Parse(e.to_string()))
    }
}

impl Transport for SheetsClient {
    fn fetch_remote(&self, document_id: &str, range_text: &str) -> Result<serde_json::Value, DispatchError> {
        let url = self.document_url(document_id);
        log::debug!("GET {} ranges={}", url, range_text);
        let resp = self.get(&url, &[("ranges", range_text), ("fields", CELL_DATA_FIELDS)])?;
        resp.json().map_err(|e| DispatchError::Parse(e.to_string()))
    }

    fn fetch_properties(&self, document_id: &str) -> Result<serde_json::Value, DispatchError> {
        let url = self.document_url(document_id);
        log::debug!("GET {} properties", url);
        let resp = self.get(&url, &[("fields", PROPERTIES_FIELDS)])?;
        resp.json().map_err(|e| DispatchError::Parse(e.to_string()))
    }
}

/// 400/422 are rejections of the request itself; anything else non-2xx is
/// reported with its status.
fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, DispatchError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(DispatchError::Rejected(body));
        }
        return Err(DispatchError::Http(status, body));
    }
    Ok(response)
}
