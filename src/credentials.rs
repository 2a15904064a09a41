use std::fs;
use std::path::Path;

use crate::error::AppError;

/// Reads the API key file and returns its trimmed contents.
pub fn read_api_key(path: &Path) -> Result<String, AppError> {
    let contents = fs::read_to_string(path).map_err(|source| AppError::Credential {
        path: path.to_path_buf(),
        source,
    })?;

    let api_key = contents.trim();
    if api_key.is_empty() {
        return Err(AppError::EmptyCredential(path.to_path_buf()));
    }

    Ok(api_key.to_string())
}
