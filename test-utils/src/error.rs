use thiserror::Error;

/// Errors that can occur while setting up a test context.
#[derive(Error, Debug)]
pub enum TestError {
    /// Creating the temporary directories or writing fixture files failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A fixture could not be serialized to or parsed from JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
