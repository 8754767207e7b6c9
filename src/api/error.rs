use thiserror::Error;

/// Failures of the `/domain-relations` fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, refused connection, timeout, broken body).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not a graph payload.
    #[error("malformed graph payload from {url}: {source}")]
    MalformedPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::MalformedPayload { url, .. } => {
                url
            }
        }
    }
}
