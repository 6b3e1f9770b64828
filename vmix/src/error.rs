use crate::document::ParseError;
use reqwest::StatusCode;

/// Errors returned by [`Vmix`](crate::Vmix).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The mixer answered with something other than `200 OK`.
    #[error("{operation} failed: {reason} ({})", .status.as_u16())]
    Request {
        operation: String,
        status: StatusCode,
        reason: String,
    },

    /// The state document was not well-formed XML.
    #[error("parse vMix state document")]
    Parse(#[from] ParseError),

    /// The request never got a response (connection refused, timeout, truncated body, ...).
    #[error("send request to vMix")]
    Transport(#[from] reqwest::Error),

    #[error("invalid vMix server address")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn request(operation: impl Into<String>, status: StatusCode) -> Self {
        Error::Request {
            operation: operation.into(),
            status,
            reason: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }

    /// The HTTP status the mixer responded with, for [`Error::Request`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
