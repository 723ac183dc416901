use thiserror::Error;

/// All errors that can occur when talking to the Transkribus REST API.
#[derive(Error, Debug)]
pub enum TranskribusError {
    /// Login, refresh or logout was rejected, or a revoked session was used.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Any other non-2xx response, with the HTTP status code and response body.
    #[error("request failed with status {status_code}: {body}")]
    Request { status_code: u16, body: String },

    /// The upload protocol could not be completed.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The download protocol could not be completed.
    #[error("download failed: {0}")]
    Download(String),

    /// A response body was not well-formed XML or JSON.
    #[error("malformed response: {0}")]
    Parse(String),

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error, typically from reading page files or writing a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The client configuration is incomplete or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<quick_xml::Error> for TranskribusError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for TranskribusError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for TranskribusError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// A convenience alias for `Result<T, TranskribusError>`.
pub type Result<T> = std::result::Result<T, TranskribusError>;
