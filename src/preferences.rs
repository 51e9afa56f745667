//! User preference text.
//!
//! The preference file is free-form text appended to the model prompt. It
//! is optional: a missing or unreadable file degrades to "no preferences"
//! with a warning instead of failing the run.

use std::path::Path;

/// Read the whole preference file.
///
/// Returns `None` (after logging a warning) when the file cannot be read,
/// and `None` without a warning when it only holds whitespace.
pub fn load_preferences(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => {
            tracing::debug!(path = %path.display(), "preference file is empty");
            None
        }
        Ok(content) => {
            tracing::info!(path = %path.display(), bytes = content.len(), "loaded preferences");
            Some(content)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not read preference file, continuing without preferences"
            );
            None
        }
    }
}
