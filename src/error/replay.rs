use thiserror::Error;

/// Errors returned by a replay parser.
///
/// The distinction matters to users: old replays get a short explanation, anything
/// else is shown with the raw error text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The replay predates StarCraft: Remastered and cannot be parsed.
    #[error("Unsupported replay version: {0}")]
    UnsupportedVersion(String),

    /// Any other parser failure.
    #[error("{0}")]
    Unknown(String),
}

impl ReplayError {
    /// Classifies a raw parser error message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains("unsupported replay version") {
            ReplayError::UnsupportedVersion(message)
        } else {
            ReplayError::Unknown(message)
        }
    }
}
