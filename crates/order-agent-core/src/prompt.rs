//! Prompt composition, argument escaping, and model-output cleanup.
//!
//! The translator sends one combined prompt to the model process and reads
//! back raw text. Everything here is pure string handling so that it can be
//! tested without a model.

use thiserror::Error;

/// Label placed before the user command when none is configured.
pub const DEFAULT_COMMAND_LABEL: &str = "User command: ";

/// Label placed before the preference text when none is configured.
pub const DEFAULT_PREFERENCES_LABEL: &str = " User preferences: ";

/// The fixed parts of a model prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// System/style preamble, read once from the prompt file.
    pub preamble: String,
    pub command_label: String,
    pub preferences_label: String,
}

impl PromptTemplate {
    /// Template with the default labels.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            command_label: DEFAULT_COMMAND_LABEL.to_string(),
            preferences_label: DEFAULT_PREFERENCES_LABEL.to_string(),
        }
    }

    /// Replace the labels placed before the command and the preferences.
    pub fn with_labels(
        mut self,
        command_label: impl Into<String>,
        preferences_label: impl Into<String>,
    ) -> Self {
        self.command_label = command_label.into();
        self.preferences_label = preferences_label.into();
        self
    }

    /// Build the combined prompt.
    ///
    /// The preferences suffix is only appended when `preferences` holds
    /// something other than whitespace.
    pub fn compose(&self, command: &str, preferences: Option<&str>) -> String {
        let mut prompt = String::with_capacity(
            self.preamble.len() + self.command_label.len() + command.len(),
        );
        prompt.push_str(&self.preamble);
        prompt.push_str(&self.command_label);
        prompt.push_str(command);
        if let Some(prefs) = preferences.filter(|p| !p.trim().is_empty()) {
            prompt.push_str(&self.preferences_label);
            prompt.push_str(prefs);
        }
        prompt
    }
}

/// Quote `text` as a single double-quoted shell word.
///
/// Every `"` and `\` gets a `\` prefix; all other bytes, multi-byte text
/// included, are copied unchanged. `$` and backticks are not escaped, so
/// the result is only safe for display or for consumers that treat the
/// argument as a plain quoted string.
pub fn escape_argument(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('"');
    escaped
}

/// Bounded trim applied to model output after the trailing newline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputTrim {
    /// Number of trailing bytes to drop (0 disables).
    pub trailing_bytes: usize,
}

impl OutputTrim {
    /// Drop `trailing_bytes` bytes from the end of every answer.
    pub fn bytes(trailing_bytes: usize) -> Self {
        Self { trailing_bytes }
    }
}

/// Errors raised while cleaning model output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleanupError {
    #[error("cannot trim {trim} trailing bytes from {len} bytes of model output")]
    TrimUnderflow { len: usize, trim: usize },
}

/// Turn raw captured bytes into a query string.
///
/// 1. Drop a single trailing `\n`.
/// 2. If anything is left, drop `trim.trailing_bytes` more bytes; output
///    shorter than that is an error.
/// 3. Decode as UTF-8 (lossy) and strip trailing control characters.
///
/// Output that is empty after step 1 yields `Ok("")`.
pub fn clean_output(raw: &[u8], trim: OutputTrim) -> Result<String, CleanupError> {
    let mut bytes = raw.strip_suffix(b"\n").unwrap_or(raw);
    if bytes.is_empty() {
        return Ok(String::new());
    }

    if trim.trailing_bytes > 0 {
        let len = bytes.len();
        if len < trim.trailing_bytes {
            return Err(CleanupError::TrimUnderflow {
                len,
                trim: trim.trailing_bytes,
            });
        }
        bytes = &bytes[..len - trim.trailing_bytes];
    }

    let text = String::from_utf8_lossy(bytes);
    Ok(text.trim_end_matches(char::is_control).to_string())
}
