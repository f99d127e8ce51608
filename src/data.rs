//! Page loading module - handles reading saved switch pages from disk.

use crate::error::EssStatError;
use std::fs;
use std::path::Path;

/// Loads a previously saved switch page.
///
/// Reads the raw HTML so it can be decoded without contacting the device.
///
/// # Returns
///
/// * `Ok(String)` - Page body, possibly empty
/// * `Err(EssStatError)` - Error if the file cannot be read
///
/// # Errors
///
/// Returns `EssStatError::Io` if the file cannot be read.
pub fn load_page(path: &Path) -> Result<String, EssStatError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
