//! Utility functions for character-safe string handling and file system checks.
//!
//! - Character counting and truncation that never splits a code point
//! - String truncation for logging
//! - File system validation for store directories

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Length of `s` in Unicode scalar values.
///
/// All summary budgets are expressed in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `max` characters of `s`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
        None => s.to_string(),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = format!("{}/..__write_check__", path.trim_end_matches('/'));
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Store directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
