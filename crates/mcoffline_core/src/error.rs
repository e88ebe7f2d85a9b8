use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Decode,
    KeyNotFound,
    Filesystem,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Prefix the message with the step that was running, keeping the code.
    pub fn context(self, what: impl AsRef<str>) -> Self {
        Self {
            code: self.code,
            message: format!("{}: {}", what.as_ref(), self.message),
        }
    }
}
