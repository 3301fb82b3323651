use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwitchError {
    /// Twitch answered with a non-success status code.
    #[error("Twitch API request to {endpoint} failed with status {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The token endpoint rejected a code exchange or refresh.
    #[error("Twitch token request failed: {0}")]
    Token(String),

    /// A configured Twitch URL could not be parsed.
    #[error("Invalid Twitch URL: {0}")]
    InvalidUrl(String),

    /// The stored token cannot be refreshed because it has no refresh token.
    ///
    /// The authorization code grant flow must be redone by hand and the new code
    /// put in the config file.
    #[error("Stored Twitch token has no refresh token")]
    MissingRefreshToken,

    /// The configured API user does not exist.
    #[error("Twitch user not found: {0}")]
    UserNotFound(String),
}
