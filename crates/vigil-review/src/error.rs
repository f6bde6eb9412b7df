//! # Design
//!
//! - One error kind per external seam; the pipeline aggregates them.
//! - Keep messages constant; carry context in structured fields.
//! - Preserve sources for diagnostics without double-logging.

use thiserror::Error;

/// Result alias for pipeline operations.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Outcome of a single content-fetch attempt that did not succeed.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The request could not be completed.
    #[error("http request failed")]
    Transport {
        /// Source HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("http response status error")]
    Status {
        /// HTTP status code returned by the server.
        status: u16,
    },
    /// The response body was not a valid record document.
    #[error("record document is not valid json")]
    Decode {
        /// Source decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// Content retrieval failed after exhausting the retry budget.
#[derive(Debug, Error)]
#[error("content retrieval exhausted retries")]
pub struct RetrievalError {
    /// Location that was being fetched.
    pub url: String,
    /// Number of attempts made before giving up.
    pub attempts: u32,
    /// Failure observed on the last attempt.
    #[source]
    pub source: FetchFailure,
}

/// Screenshot rendering failed.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture request could not be completed.
    #[error("screenshot request failed")]
    Transport {
        /// Target URL being captured.
        url: String,
        /// Source HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("screenshot provider status error")]
    Status {
        /// Target URL being captured.
        url: String,
        /// HTTP status code returned by the provider.
        status: u16,
    },
}

/// Image upload failed.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The upload request could not be completed.
    #[error("image upload request failed")]
    Transport {
        /// Source HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The host answered with a non-success status.
    #[error("image host status error")]
    Status {
        /// HTTP status code returned by the host.
        status: u16,
    },
    /// The host's response did not contain a usable image URL.
    #[error("image host response was not decodable")]
    Decode {
        /// Source decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// Report emission failed at the collaborator boundary.
#[derive(Debug, Error)]
#[error("report emission failed")]
pub struct EmitError {
    /// Underlying collaborator error.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl EmitError {
    /// Wrap a collaborator error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Terminal pipeline error; any variant aborts the remainder of the run.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Fetching record content failed.
    #[error("record retrieval failed")]
    Retrieval {
        /// Operation identifier.
        operation: &'static str,
        /// Source retrieval error.
        #[source]
        source: RetrievalError,
    },
    /// Rendering the screenshot failed.
    #[error("screenshot capture failed")]
    Capture {
        /// Path of the file being reviewed.
        path: String,
        /// Source capture error.
        #[source]
        source: CaptureError,
    },
    /// Publishing the screenshot failed.
    #[error("screenshot publish failed")]
    Publish {
        /// Path of the file being reviewed.
        path: String,
        /// Source publish error.
        #[source]
        source: PublishError,
    },
    /// Posting the report failed.
    #[error("report post failed")]
    Emit {
        /// Issue or pull request number targeted.
        issue_number: u64,
        /// Source emit error.
        #[source]
        source: EmitError,
    },
}

impl ReviewError {
    pub(crate) const fn retrieval(operation: &'static str, source: RetrievalError) -> Self {
        Self::Retrieval { operation, source }
    }

    pub(crate) const fn capture(path: String, source: CaptureError) -> Self {
        Self::Capture { path, source }
    }

    pub(crate) const fn publish(path: String, source: PublishError) -> Self {
        Self::Publish { path, source }
    }

    pub(crate) const fn emit(issue_number: u64, source: EmitError) -> Self {
        Self::Emit {
            issue_number,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn retrieval_error_preserves_source_chain() {
        let error = RetrievalError {
            url: "http://example.invalid/record.json".to_string(),
            attempts: 2,
            source: FetchFailure::Status { status: 503 },
        };
        assert_eq!(error.attempts, 2);
        assert!(error.source().is_some());
    }

    #[test]
    fn review_error_helpers_build_variants() {
        let retrieval = ReviewError::retrieval(
            "fetch.current",
            RetrievalError {
                url: "http://example.invalid/a.json".to_string(),
                attempts: 2,
                source: FetchFailure::Status { status: 404 },
            },
        );
        assert!(matches!(retrieval, ReviewError::Retrieval { .. }));

        let capture = ReviewError::capture(
            "domains/a.json".to_string(),
            CaptureError::Status {
                url: "http://a.example.com".to_string(),
                status: 500,
            },
        );
        assert!(matches!(capture, ReviewError::Capture { .. }));

        let emit = ReviewError::emit(7, EmitError::new(io::Error::other("post failed")));
        assert!(matches!(
            emit,
            ReviewError::Emit {
                issue_number: 7,
                ..
            }
        ));
    }
}
