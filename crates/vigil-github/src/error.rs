//! # Design
//!
//! - Single crate-level error for GitHub REST interactions.
//! - Constant messages; operation, URL, and status carried as fields.

use thiserror::Error;

/// Result alias for GitHub client operations.
pub type GithubResult<T> = Result<T, GithubError>;

/// Errors raised by the GitHub REST client.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The request could not be completed.
    #[error("github request failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// URL used for the request.
        url: String,
        /// Source HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// GitHub answered with a non-success status.
    #[error("github response status error")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// URL used for the request.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },
    /// The response body could not be decoded.
    #[error("github response was not decodable")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Source decode error.
        #[source]
        source: reqwest::Error,
    },
    /// An endpoint URL could not be constructed.
    #[error("github endpoint url is invalid")]
    InvalidUrl {
        /// Operation identifier.
        operation: &'static str,
        /// Source parse error.
        #[source]
        source: url::ParseError,
    },
}
