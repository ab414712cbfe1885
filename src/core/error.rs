use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum PulseError {
    /// An error occurred during an HTTP request to the news provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload or provider response could not be deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The provider returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The data received was in an unexpected format or missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// A failure at the event-bus boundary (publish or subscribe).
    #[error("Bus error: {0}")]
    Bus(String),
}
