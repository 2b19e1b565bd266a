//! Sheets API transport over HTTP.
//!
//! [`SheetsClient`] implements the engine's `Dispatcher` and `Transport`
//! traits with a blocking reqwest client (no Tokio runtime required). Views
//! borrow one client; nothing here caches or retries.

mod auth;
mod client;

pub use auth::{auth_file_path, delete_auth, delete_auth_at, load_auth, load_auth_from, save_auth, save_auth_to, Credentials};
pub use client::{ClientError, SheetsClient};
