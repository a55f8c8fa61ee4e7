//! Error types raised while talking to the remote settlement endpoint.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`GatewayError`] failures.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures that can occur while calling the settlement endpoint.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request body could not be encoded.
    #[error("failed to encode settlement request")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    /// The request could not be sent or no response arrived.
    #[error("failed to reach settlement endpoint `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("request failed: {}", status.as_u16())]
    RequestStatus { url: String, status: StatusCode },
    /// The response body is not the expected JSON document.
    #[error("failed to decode settlement response from `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
