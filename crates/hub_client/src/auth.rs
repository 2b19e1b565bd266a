//! Token storage.
//!
//! Reads/writes ~/.config/sheetbatch/auth.json (0600 on Unix).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sheetbatch_config::DEFAULT_API_BASE;

use crate::client::ClientError;

/// Bearer token plus the API it is valid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth access token sent as `Authorization: Bearer`
    pub token: String,
    /// API base URL (e.g., "https://sheets.googleapis.com/v4")
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Credentials {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self { token: token.into(), api_base: api_base.into() }
    }
}

/// Returns the path to the credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("sheetbatch/auth.json"))
}

/// Load saved credentials from the default path.
/// Returns None if nothing is saved or the file is invalid.
pub fn load_auth() -> Option<Credentials> {
    load_auth_from(&auth_file_path()?)
}

pub fn load_auth_from(path: &Path) -> Option<Credentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(creds) => Some(creds),
        Err(e) => {
            log::warn!("Ignoring invalid credentials file {}: {}", path.display(), e);
            None
        }
    }
}

/// Save credentials to the default path.
pub fn save_auth(creds: &Credentials) -> Result<(), ClientError> {
    let path = auth_file_path().ok_or_else(|| ClientError::Io("Could not determine config directory".into()))?;
    save_auth_to(creds, &path)
}

/// Save credentials to `path`, creating the parent directory.
/// Sets 0600 permissions on Unix.
pub fn save_auth_to(creds: &Credentials, path: &Path) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ClientError::Io(format!("Failed to create config directory: {}", e)))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| ClientError::Io(format!("Failed to serialize credentials: {}", e)))?;

    std::fs::write(path, &contents).map_err(|e| ClientError::Io(format!("Failed to write auth file: {}", e)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| ClientError::Io(format!("Failed to set file permissions: {}", e)))?;
    }

    Ok(())
}

/// Delete saved credentials. Missing files are fine.
pub fn delete_auth() -> Result<(), ClientError> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    delete_auth_at(&path)
}

pub fn delete_auth_at(path: &Path) -> Result<(), ClientError> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| ClientError::Io(format!("Failed to delete auth file: {}", e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_default_api_base() {
        let parsed: Credentials = serde_json::from_str(r#"{"token":"tok"}"#).unwrap();
        assert_eq!(parsed.token, "tok");
        assert_eq!(parsed.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_auth_file_path() {
        let path = auth_file_path().unwrap();
        assert!(path.to_string_lossy().contains("sheetbatch"));
        assert!(path.to_string_lossy().ends_with("auth.json"));
    }

    #[test]
    fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/auth.json");

        let creds = Credentials::new("tok123", "https://api.test");
        save_auth_to(&creds, &path).unwrap();
        assert_eq!(load_auth_from(&path), Some(creds));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        delete_auth_at(&path).unwrap();
        assert!(!path.exists());
        assert!(load_auth_from(&path).is_none());
        // deleting twice is not an error
        delete_auth_at(&path).unwrap();
    }

    #[test]
    fn test_invalid_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_auth_from(&path).is_none());
    }
}
