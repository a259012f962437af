use std::error::Error;
use std::fmt;

/// Failure modes of a summarization request.
///
/// Malformed intermediate stream records are not represented here: the
/// ingestor logs and skips them without aborting the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    /// The backend could not be reached, or answered outside the 2xx range.
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// The byte stream ended before any done or error record arrived.
    StreamEndedUnexpectedly,
    /// The server reported a failure through an SSE error record.
    Upstream(String),
    /// The request was rejected before it was sent.
    InvalidRequest(String),
    /// The caller cancelled the request mid-flight.
    Cancelled,
}

impl SummarizeError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        SummarizeError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub(crate) fn http_status(status: u16, body: impl Into<String>) -> Self {
        SummarizeError::Transport {
            status: Some(status),
            message: body.into(),
        }
    }
}

impl fmt::Display for SummarizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummarizeError::Transport {
                status: Some(status),
                message,
            } => write!(f, "request failed with HTTP {status}: {message}"),
            SummarizeError::Transport {
                status: None,
                message,
            } => write!(f, "request failed: {message}"),
            SummarizeError::StreamEndedUnexpectedly => {
                write!(f, "stream ended before a completion record arrived")
            }
            SummarizeError::Upstream(message) => write!(f, "{message}"),
            SummarizeError::InvalidRequest(message) => write!(f, "{message}"),
            SummarizeError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl Error for SummarizeError {}
