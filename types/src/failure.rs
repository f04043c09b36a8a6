use thiserror::Error;

/// A failure a stub was declared to raise.
///
/// The engine propagates this to the original call site unchanged and never
/// catches it; the test either asserts on it directly or relies on
/// existence-style verification, which tolerates calls whose behavior
/// raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeclaredFailure {
    message: String,
}

impl DeclaredFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
